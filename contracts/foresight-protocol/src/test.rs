#![cfg(test)]

use super::*;

use crate::config::{ConfigManager, ONE_TOKEN};
use crate::storage::LedgerStore;

use soroban_sdk::{
    testutils::{Address as _, Events, Ledger},
    token::{self, StellarAssetClient},
    vec, String,
};

pub const START: u64 = 1_000_000;
pub const DAY: u64 = 86_400;
pub const FUNDING: i128 = 1_000 * ONE_TOKEN;

// Test setup structures
pub struct ForesightTest {
    pub env: Env,
    pub contract_id: Address,
    pub token: Address,
    pub admin: Address,
    pub treasury: Address,
    pub creator: Address,
    pub alice: Address,
    pub bob: Address,
    pub carol: Address,
}

impl ForesightTest {
    pub fn setup() -> Self {
        Self::setup_with_protocol_fee(0)
    }

    pub fn setup_with_protocol_fee(protocol_fee_bps: u32) -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().set_timestamp(START);

        let admin = Address::generate(&env);
        let treasury = Address::generate(&env);
        let creator = Address::generate(&env);
        let alice = Address::generate(&env);
        let bob = Address::generate(&env);
        let carol = Address::generate(&env);

        let token_admin = Address::generate(&env);
        let token = env.register_stellar_asset_contract_v2(token_admin).address();
        let minter = StellarAssetClient::new(&env, &token);
        for user in [&alice, &bob, &carol] {
            minter.mint(user, &FUNDING);
        }

        let contract_id = env.register(ForesightProtocol, ());
        let client = ForesightProtocolClient::new(&env, &contract_id);
        let mut config = ConfigManager::get_development_config(&treasury, &admin);
        config.protocol_fee_bps = protocol_fee_bps;
        client.initialize_with_config(&admin, &config);
        client.initialize_protocol_stats(&admin);

        Self {
            env,
            contract_id,
            token,
            admin,
            treasury,
            creator,
            alice,
            bob,
            carol,
        }
    }

    pub fn client(&self) -> ForesightProtocolClient<'_> {
        ForesightProtocolClient::new(&self.env, &self.contract_id)
    }

    pub fn balance(&self, who: &Address) -> i128 {
        token::Client::new(&self.env, &self.token).balance(who)
    }

    pub fn now(&self) -> u64 {
        self.env.ledger().timestamp()
    }

    pub fn jump(&self, seconds: u64) {
        self.env.ledger().set_timestamp(self.now() + seconds);
    }

    pub fn market_params(&self, creator_fee_bps: Option<u32>) -> MarketParams {
        MarketParams {
            question: String::from_str(&self.env, "Will the launch happen before the deadline?"),
            outcomes: vec![
                &self.env,
                String::from_str(&self.env, "Yes"),
                String::from_str(&self.env, "No"),
            ],
            ai_score: 80,
            resolution_time: self.now() + DAY,
            market_type: MarketType::TimeBound,
            ai_classification: 1,
            metadata: String::from_str(&self.env, "{\"source\":\"test\"}"),
            creator_fee_bps,
            ai_resolvable: None,
            token: self.token.clone(),
        }
    }

    pub fn create_market(&self, creator_fee_bps: Option<u32>) -> MarketId {
        self.client()
            .create_market(&self.creator, &self.market_params(creator_fee_bps))
    }
}

// ===== INITIALIZATION =====

#[test]
fn test_initialize_only_once() {
    let test = ForesightTest::setup();
    let client = test.client();

    assert_eq!(client.get_admin(), test.admin);
    let result = client.try_initialize(&test.admin, &test.treasury, &Environment::Mainnet);
    assert_eq!(result, Err(Ok(Error::AlreadyExists)));
    assert_eq!(
        client.try_initialize_protocol_stats(&test.admin),
        Err(Ok(Error::AlreadyExists))
    );
}

#[test]
fn test_initialize_with_preset() {
    let env = Env::default();
    env.mock_all_auths();
    let admin = Address::generate(&env);
    let treasury = Address::generate(&env);
    let contract_id = env.register(ForesightProtocol, ());
    let client = ForesightProtocolClient::new(&env, &contract_id);

    assert_eq!(client.try_get_config(), Err(Ok(Error::NotInitialized)));
    let config = client.initialize(&admin, &treasury, &Environment::Testnet);
    assert_eq!(config.environment, Environment::Testnet);
    assert_eq!(config.oracle_authority, admin);
    assert_eq!(client.get_config(), config);
}

#[test]
fn test_update_config_requires_admin() {
    let test = ForesightTest::setup();
    let client = test.client();
    let mut config = client.get_config();
    config.restake_policy = RestakePolicy::SingleStake;

    assert_eq!(
        client.try_update_config(&test.alice, &config),
        Err(Ok(Error::Unauthorized))
    );

    let mut bad = config.clone();
    bad.max_outcomes = 1;
    assert_eq!(
        client.try_update_config(&test.admin, &bad),
        Err(Ok(Error::InvalidConfig))
    );

    client.update_config(&test.admin, &config);
    assert_eq!(client.get_config().restake_policy, RestakePolicy::SingleStake);
}

// ===== PROFILES =====

#[test]
fn test_profiles() {
    let test = ForesightTest::setup();
    let client = test.client();

    client.create_creator_profile(&test.creator);
    assert_eq!(
        client.try_create_creator_profile(&test.creator),
        Err(Ok(Error::AlreadyExists))
    );

    let profile = client.initialize_user_profile(&test.alice);
    assert_eq!(profile.total_predictions, 0);
    assert_eq!(
        client.try_initialize_user_profile(&test.alice),
        Err(Ok(Error::AlreadyExists))
    );
    assert_eq!(client.get_protocol_stats().total_users, 1);

    assert_eq!(
        client.try_get_user_profile(&test.bob),
        Err(Ok(Error::ProfileNotFound))
    );
}

#[test]
fn test_first_stake_opens_user_profile() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));

    client.stake_prediction(&test.alice, &market, &0, &100);
    let profile = client.get_user_profile(&test.alice);
    assert_eq!(profile.total_predictions, 1);
    assert_eq!(client.get_protocol_stats().total_users, 1);
}

// ===== MARKET CREATION =====

#[test]
fn test_create_market_assigns_sequential_indices() {
    let test = ForesightTest::setup();
    let client = test.client();

    let first = test.create_market(Some(0));
    assert!(!test.env.events().all().is_empty());
    let second = test.create_market(Some(0));
    assert_eq!(first.index, 0);
    assert_eq!(second.index, 1);
    assert_eq!(first.creator, test.creator);

    let market = client.get_market(&first);
    assert_eq!(market.total_pool, 0);
    assert_eq!(market.stakes_per_outcome, vec![&test.env, 0i128, 0i128]);
    assert_eq!(market.deadline, Some(START + DAY));
    assert!(market.ai_resolvable);
    assert_eq!(market.resolver_authority, test.admin);

    let vault = client.get_vault(&first);
    assert_eq!(vault.balance, 0);
    assert_eq!(vault.token, test.token);

    assert_eq!(client.get_creator_profile(&test.creator).markets_created, 2);
    assert_eq!(client.get_protocol_stats().total_markets, 2);
    assert_eq!(client.get_market_state(&first), MarketState::Created);
}

#[test]
fn test_create_market_validation() {
    let test = ForesightTest::setup();
    let client = test.client();

    let mut params = test.market_params(Some(0));
    params.outcomes = vec![&test.env, String::from_str(&test.env, "Only")];
    assert_eq!(
        client.try_create_market(&test.creator, &params),
        Err(Ok(Error::InvalidArgument))
    );

    let mut params = test.market_params(Some(0));
    params.question = String::from_str(&test.env, "");
    assert_eq!(
        client.try_create_market(&test.creator, &params),
        Err(Ok(Error::InvalidArgument))
    );

    let mut params = test.market_params(Some(0));
    params.resolution_time = START;
    assert_eq!(
        client.try_create_market(&test.creator, &params),
        Err(Ok(Error::InvalidArgument))
    );

    let mut params = test.market_params(Some(0));
    params.ai_score = 101;
    assert_eq!(
        client.try_create_market(&test.creator, &params),
        Err(Ok(Error::InvalidArgument))
    );

    let params = test.market_params(Some(1_001));
    assert_eq!(
        client.try_create_market(&test.creator, &params),
        Err(Ok(Error::InvalidArgument))
    );

    // nothing was created
    assert_eq!(client.get_protocol_stats().total_markets, 0);
}

#[test]
fn test_open_ended_market_has_no_deadline() {
    let test = ForesightTest::setup();
    let client = test.client();
    let mut params = test.market_params(None);
    params.market_type = MarketType::OpenEnded;
    params.resolution_time = 0;
    params.ai_score = 10;

    let id = client.create_market(&test.creator, &params);
    let market = client.get_market(&id);
    assert_eq!(market.deadline, None);
    assert!(!market.ai_resolvable);
    assert_eq!(market.creator_fee_bps, 150);

    test.jump(365 * DAY);
    client.stake_prediction(&test.alice, &id, &1, &10);
    assert_eq!(client.get_market_state(&id), MarketState::Staking);
}

// ===== STAKING =====

#[test]
fn test_two_users_stake_opposite_outcomes() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));

    client.stake_prediction(&test.alice, &market, &0, &100);
    client.stake_prediction(&test.bob, &market, &1, &50);

    let state = client.get_market(&market);
    assert_eq!(state.total_pool, 150);
    assert_eq!(state.stakes_per_outcome, vec![&test.env, 100i128, 50i128]);
    assert_eq!(state.staker_count, 2);
    assert_eq!(client.get_vault(&market).balance, 150);
    assert_eq!(test.balance(&test.contract_id), 150);
    assert_eq!(test.balance(&test.alice), FUNDING - 100);

    let prediction = client.get_prediction(&market, &test.alice);
    assert_eq!(prediction.outcome_index, 0);
    assert_eq!(prediction.amount, 100);
    assert!(!prediction.claimed);

    let stats = client.get_protocol_stats();
    assert_eq!(stats.total_stakes, 2);
    assert_eq!(stats.total_volume, 150);
    assert_eq!(client.get_creator_profile(&test.creator).total_volume, 150);
    assert_eq!(client.get_market_state(&market), MarketState::Staking);
}

#[test]
fn test_stake_rejections() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));

    assert_eq!(
        client.try_stake_prediction(&test.alice, &market, &2, &10),
        Err(Ok(Error::InvalidArgument))
    );
    assert_eq!(
        client.try_stake_prediction(&test.alice, &market, &0, &0),
        Err(Ok(Error::InvalidArgument))
    );
    assert_eq!(
        client.try_stake_prediction(&test.alice, &market, &0, &(FUNDING + 1)),
        Err(Ok(Error::InsufficientFunds))
    );

    let stranger = Address::generate(&test.env);
    let missing = MarketId {
        creator: stranger,
        index: 0,
    };
    assert_eq!(
        client.try_stake_prediction(&test.alice, &missing, &0, &10),
        Err(Ok(Error::MarketNotFound))
    );

    assert_eq!(client.get_market(&market).total_pool, 0);
    assert_eq!(test.balance(&test.alice), FUNDING);
}

#[test]
fn test_stake_after_deadline_is_closed() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));

    test.jump(DAY);
    assert_eq!(
        client.try_stake_prediction(&test.alice, &market, &0, &10),
        Err(Ok(Error::StakingClosed))
    );
    assert_eq!(client.get_market_state(&market), MarketState::PendingResolution);
}


#[test]
fn test_stake_closed_while_proposal_pending() {
    let test = ForesightTest::setup();
    let client = test.client();
    let mut params = test.market_params(Some(0));
    params.market_type = MarketType::OpenEnded;
    params.resolution_time = 0;
    let market = client.create_market(&test.creator, &params);

    client.stake_prediction(&test.alice, &market, &0, &50);
    client.propose_resolution(&test.admin, &market, &0);
    assert_eq!(client.get_market_state(&market), MarketState::PendingResolution);

    assert_eq!(
        client.try_stake_prediction(&test.bob, &market, &1, &50),
        Err(Ok(Error::StakingClosed))
    );
    assert_eq!(
        client.try_stake_prediction(&test.alice, &market, &0, &50),
        Err(Ok(Error::StakingClosed))
    );
    assert_eq!(client.get_vault(&market).balance, 50);
    assert_eq!(test.balance(&test.bob), FUNDING);
}
#[test]
fn test_restake_accumulates_on_same_outcome() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));

    client.stake_prediction(&test.alice, &market, &0, &100);
    let prediction = client.stake_prediction(&test.alice, &market, &0, &25);
    assert_eq!(prediction.amount, 125);
    assert_eq!(
        client.try_stake_prediction(&test.alice, &market, &1, &10),
        Err(Ok(Error::OutcomeLocked))
    );

    let state = client.get_market(&market);
    assert_eq!(state.total_pool, 125);
    assert_eq!(state.staker_count, 1);
    assert_eq!(client.get_user_profile(&test.alice).total_predictions, 1);
    assert_eq!(client.get_protocol_stats().total_stakes, 2);
}

#[test]
fn test_single_stake_policy() {
    let test = ForesightTest::setup();
    let client = test.client();
    let mut config = client.get_config();
    config.restake_policy = RestakePolicy::SingleStake;
    client.update_config(&test.admin, &config);
    let market = test.create_market(Some(0));

    client.stake_prediction(&test.alice, &market, &0, &100);
    assert_eq!(
        client.try_stake_prediction(&test.alice, &market, &0, &100),
        Err(Ok(Error::AlreadyExists))
    );
}

// ===== ADMIN RESOLUTION AND CLAIMS =====

#[test]
fn test_winner_takes_pool_without_fees() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    client.stake_prediction(&test.alice, &market, &0, &100);
    client.stake_prediction(&test.bob, &market, &1, &50);

    // admin may decide before the deadline
    assert_eq!(client.resolve_market(&test.admin, &market, &Some(0)), 0);
    assert_eq!(client.get_market_state(&market), MarketState::Resolved);

    let quote = client.quote_payout(&test.alice, &market);
    assert_eq!(quote.payout, 150);

    assert_eq!(client.claim_reward(&test.alice, &market), 150);
    assert_eq!(test.balance(&test.alice), FUNDING - 100 + 150);
    assert_eq!(client.get_vault(&market).balance, 0);

    assert_eq!(
        client.try_claim_reward(&test.bob, &market),
        Err(Ok(Error::NotWinningOutcome))
    );
    assert_eq!(
        client.try_claim_reward(&test.alice, &market),
        Err(Ok(Error::AlreadyClaimed))
    );

    let profile = client.get_user_profile(&test.alice);
    assert_eq!(profile.winning_predictions, 1);
    assert_eq!(profile.total_winnings, 150);
    assert!(client.get_prediction(&market, &test.alice).claimed);

    let stats = client.get_protocol_stats();
    assert_eq!(stats.total_resolved, 1);
    assert_eq!(stats.total_paid_out, 150);

    let record = client.get_resolution(&market).unwrap();
    assert_eq!(record.method, ResolutionMethod::AdminOverride);
    assert_eq!(record.resolved_by, test.admin);
}

#[test]
fn test_creator_fee_is_paid_on_claim() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(500));
    client.stake_prediction(&test.alice, &market, &0, &50_000_000);
    client.stake_prediction(&test.bob, &market, &1, &30_000_000);
    client.resolve_market(&test.admin, &market, &Some(0));

    assert_eq!(client.claim_reward(&test.alice, &market), 76_000_000);
    assert_eq!(test.balance(&test.creator), 4_000_000);
    assert_eq!(test.balance(&test.treasury), 0);
    assert_eq!(client.get_vault(&market).balance, 0);
}

#[test]
fn test_protocol_fee_goes_to_treasury() {
    let test = ForesightTest::setup_with_protocol_fee(100);
    let client = test.client();
    let market = test.create_market(Some(0));
    assert_eq!(client.get_market(&market).protocol_fee_bps, 100);
    client.stake_prediction(&test.alice, &market, &0, &100);
    client.stake_prediction(&test.bob, &market, &1, &100);
    client.resolve_market(&test.admin, &market, &Some(0));

    assert_eq!(client.claim_reward(&test.alice, &market), 198);
    assert_eq!(test.balance(&test.treasury), 2);
}

#[test]
fn test_stake_after_resolution_rejected() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    client.stake_prediction(&test.alice, &market, &0, &100);
    client.resolve_market(&test.admin, &market, &Some(1));

    assert_eq!(
        client.try_stake_prediction(&test.bob, &market, &0, &10),
        Err(Ok(Error::AlreadyResolved))
    );
    assert_eq!(
        client.try_resolve_market(&test.admin, &market, &Some(0)),
        Err(Ok(Error::AlreadyResolved))
    );
    assert_eq!(client.get_market(&market).winning_outcome, Some(1));
}

#[test]
fn test_resolution_and_claim_guards() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    client.stake_prediction(&test.alice, &market, &0, &100);

    assert_eq!(
        client.try_claim_reward(&test.alice, &market),
        Err(Ok(Error::MarketNotResolved))
    );
    assert_eq!(
        client.try_resolve_market(&test.alice, &market, &Some(0)),
        Err(Ok(Error::Unauthorized))
    );
    assert_eq!(
        client.try_resolve_market(&test.admin, &market, &Some(5)),
        Err(Ok(Error::InvalidArgument))
    );
    // nothing to ratify
    assert_eq!(
        client.try_resolve_market(&test.admin, &market, &None),
        Err(Ok(Error::InvalidArgument))
    );

    client.resolve_market(&test.admin, &market, &Some(0));
    assert_eq!(
        client.try_claim_reward(&test.bob, &market),
        Err(Ok(Error::PredictionNotFound))
    );
}

// ===== ORACLE PATH =====

#[test]
fn test_oracle_resolution() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    let mut params = test.market_params(Some(0));
    params.ai_resolvable = Some(false);
    let manual = client.create_market(&test.creator, &params);
    let evidence = String::from_str(&test.env, "ipfs://report");

    assert_eq!(
        client.try_resolve_market_via_ai(&test.admin, &market, &0, &9_000, &evidence),
        Err(Ok(Error::ResolverNotFound))
    );
    client.initialize_ai_resolver(&test.admin);
    assert_eq!(
        client.try_resolve_market_via_ai(&test.admin, &market, &0, &9_000, &evidence),
        Err(Ok(Error::NotYetEligible))
    );

    test.jump(DAY);
    assert_eq!(
        client.try_resolve_market_via_ai(&test.admin, &market, &0, &4_000, &evidence),
        Err(Ok(Error::InvalidArgument))
    );
    assert_eq!(
        client.try_resolve_market_via_ai(&test.admin, &market, &0, &10_001, &evidence),
        Err(Ok(Error::InvalidArgument))
    );
    assert_eq!(
        client.try_resolve_market_via_ai(&test.admin, &manual, &0, &9_000, &evidence),
        Err(Ok(Error::NotAiResolvable))
    );

    let other = Address::generate(&test.env);
    client.initialize_ai_resolver(&other);
    assert_eq!(
        client.try_resolve_market_via_ai(&other, &market, &0, &9_000, &evidence),
        Err(Ok(Error::Unauthorized))
    );

    client.set_ai_resolver_active(&test.admin, &test.admin, &false);
    assert_eq!(
        client.try_resolve_market_via_ai(&test.admin, &market, &0, &9_000, &evidence),
        Err(Ok(Error::ResolverInactive))
    );
    client.set_ai_resolver_active(&test.admin, &test.admin, &true);

    assert_eq!(
        client.resolve_market_via_ai(&test.admin, &market, &1, &9_000, &evidence),
        1
    );
    let report = client.get_oracle_report(&market).unwrap();
    assert_eq!(report.outcome, 1);
    assert_eq!(report.confidence_bps, 9_000);
    assert_eq!(client.get_ai_resolver(&test.admin).resolutions, 1);
    assert_eq!(
        client.get_resolution(&market).unwrap().method,
        ResolutionMethod::OracleReport
    );
    assert_eq!(
        client.try_resolve_market_via_ai(&test.admin, &market, &0, &9_000, &evidence),
        Err(Ok(Error::AlreadyResolved))
    );
}

#[test]
fn test_oracle_cannot_override_pending_proposal() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    let voter = Address::generate(&test.env);
    let evidence = String::from_str(&test.env, "ipfs://report");
    client.initialize_ai_resolver(&test.admin);
    client.register_vote_authority(&test.admin, &market, &voter, &1);

    test.jump(DAY);
    client.propose_resolution(&voter, &market, &0);
    assert_eq!(
        client.try_resolve_market_via_ai(&test.admin, &market, &1, &9_000, &evidence),
        Err(Ok(Error::ProposalPending))
    );

    // the window elapsing does not open the oracle path either
    test.jump(client.get_config().challenge_window);
    assert_eq!(
        client.try_resolve_market_via_ai(&test.admin, &market, &1, &9_000, &evidence),
        Err(Ok(Error::ProposalPending))
    );
    assert!(client.get_oracle_report(&market).is_none());

    assert_eq!(client.finalize_resolution(&market), 0);
    assert_eq!(client.get_market(&market).winning_outcome, Some(0));
    assert_eq!(client.get_ai_resolver(&test.admin).resolutions, 0);
}

#[test]
fn test_oracle_rejected_while_challenged() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    let evidence = String::from_str(&test.env, "ipfs://report");
    client.initialize_ai_resolver(&test.admin);

    test.jump(DAY);
    client.propose_resolution(&test.admin, &market, &0);
    client.challenge_resolution(&test.carol, &market, &String::from_str(&test.env, "wrong"));
    assert_eq!(
        client.try_resolve_market_via_ai(&test.admin, &market, &1, &9_000, &evidence),
        Err(Ok(Error::ResolutionChallenged))
    );
    assert!(!client.get_market(&market).resolved);

    client.resolve_market(&test.admin, &market, &Some(1));
    assert_eq!(test.balance(&test.carol), FUNDING);
}

// ===== STAKE-WEIGHTED VOTE =====

#[test]
fn test_vote_tie_then_tie_break() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    let v1 = Address::generate(&test.env);
    let v2 = Address::generate(&test.env);
    let v3 = Address::generate(&test.env);

    assert_eq!(
        client.try_stake_weighted_vote(&v1, &market, &0),
        Err(Ok(Error::VoteResultNotFound))
    );
    client.initialize_vote_result(&test.admin, &market);
    client.register_vote_authority(&test.admin, &market, &v1, &10);
    client.register_vote_authority(&test.admin, &market, &v2, &10);
    assert_eq!(
        client.try_register_vote_authority(&test.admin, &market, &v3, &0),
        Err(Ok(Error::InvalidArgument))
    );
    assert_eq!(
        client.try_stake_weighted_vote(&v3, &market, &0),
        Err(Ok(Error::VoteAuthorityNotFound))
    );

    client.stake_weighted_vote(&v1, &market, &0);
    client.stake_weighted_vote(&v2, &market, &1);
    assert_eq!(
        client.try_stake_weighted_vote(&v1, &market, &1),
        Err(Ok(Error::AlreadyVoted))
    );
    assert_eq!(
        client.try_finalize_resolution(&market),
        Err(Ok(Error::NotYetEligible))
    );

    test.jump(DAY);
    assert_eq!(client.try_finalize_resolution(&market), Err(Ok(Error::VoteTied)));
    assert!(!client.get_vote_result(&market).closed);

    client.register_vote_authority(&test.admin, &market, &v3, &5);
    client.stake_weighted_vote(&v3, &market, &0);
    assert_eq!(client.finalize_resolution(&market), 0);

    let tally = client.get_vote_result(&market);
    assert!(tally.closed);
    assert_eq!(tally.tallies, vec![&test.env, 15i128, 10i128]);
    assert_eq!(tally.votes_cast, 3);
    assert_eq!(client.get_vote_authority(&market, &v3).voted_outcome, Some(0));
    assert_eq!(
        client.get_resolution(&market).unwrap().method,
        ResolutionMethod::StakeWeightedVote
    );
    assert_eq!(
        client.try_stake_weighted_vote(&v1, &market, &0),
        Err(Ok(Error::AlreadyResolved))
    );
}

#[test]
fn test_close_voting_stops_votes() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    let v1 = Address::generate(&test.env);
    let v2 = Address::generate(&test.env);

    client.initialize_vote_result(&test.admin, &market);
    client.register_vote_authority(&test.admin, &market, &v1, &4);
    client.register_vote_authority(&test.admin, &market, &v2, &9);
    client.stake_weighted_vote(&v1, &market, &1);

    assert_eq!(
        client.try_close_voting(&test.alice, &market),
        Err(Ok(Error::Unauthorized))
    );
    let closed = client.close_voting(&test.admin, &market);
    assert!(closed.closed);
    assert_eq!(closed.votes_cast, 1);

    assert_eq!(
        client.try_stake_weighted_vote(&v2, &market, &0),
        Err(Ok(Error::VotingClosed))
    );
    assert_eq!(
        client.try_close_voting(&test.admin, &market),
        Err(Ok(Error::VotingClosed))
    );

    test.jump(DAY);
    assert_eq!(client.finalize_resolution(&market), 1);
    assert_eq!(client.get_vote_result(&market).tallies, vec![&test.env, 0i128, 4i128]);
}

// ===== PROPOSE / CHALLENGE =====

#[test]
fn test_unchallenged_proposal_finalizes() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    let voter = Address::generate(&test.env);
    client.register_vote_authority(&test.admin, &market, &voter, &1);

    assert_eq!(
        client.try_propose_resolution(&voter, &market, &0),
        Err(Ok(Error::NotYetEligible))
    );
    test.jump(DAY);
    assert_eq!(
        client.try_propose_resolution(&test.alice, &market, &0),
        Err(Ok(Error::Unauthorized))
    );

    let proposal = client.propose_resolution(&voter, &market, &0);
    let window = client.get_config().challenge_window;
    assert_eq!(proposal.challenge_deadline, test.now() + window);
    assert_eq!(proposal.status, ProposalStatus::Pending);
    assert_eq!(
        client.try_propose_resolution(&test.admin, &market, &1),
        Err(Ok(Error::AlreadyExists))
    );
    assert_eq!(client.get_market_state(&market), MarketState::PendingResolution);

    assert_eq!(
        client.try_finalize_resolution(&market),
        Err(Ok(Error::NotYetEligible))
    );
    test.jump(window);
    assert_eq!(client.finalize_resolution(&market), 0);

    let record = client.get_resolution(&market).unwrap();
    assert_eq!(record.method, ResolutionMethod::Challenge);
    assert_eq!(record.resolved_by, voter);
}

#[test]
fn test_challenge_upheld_refunds_bond() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    let bond = client.get_config().challenge_bond;
    let evidence = String::from_str(&test.env, "counter evidence");

    test.jump(DAY);
    client.propose_resolution(&test.admin, &market, &0);
    let challenge = client.challenge_resolution(&test.carol, &market, &evidence);
    assert_eq!(challenge.bond, bond);
    assert_eq!(test.balance(&test.carol), FUNDING - bond);
    assert_eq!(client.get_proposal(&market).status, ProposalStatus::Challenged);
    assert_eq!(
        client.try_challenge_resolution(&test.bob, &market, &evidence),
        Err(Ok(Error::AlreadyExists))
    );

    test.jump(client.get_config().challenge_window);
    assert_eq!(
        client.try_finalize_resolution(&market),
        Err(Ok(Error::ResolutionChallenged))
    );

    client.resolve_market(&test.admin, &market, &Some(1));
    assert_eq!(test.balance(&test.carol), FUNDING);
    assert_eq!(client.get_market(&market).winning_outcome, Some(1));
}

#[test]
fn test_challenge_rejected_forfeits_bond() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    let bond = client.get_config().challenge_bond;
    let evidence = String::from_str(&test.env, "");

    test.jump(DAY);
    client.propose_resolution(&test.admin, &market, &0);
    client.challenge_resolution(&test.carol, &market, &evidence);

    // ratify the proposal
    assert_eq!(client.resolve_market(&test.admin, &market, &None), 0);
    assert_eq!(test.balance(&test.carol), FUNDING - bond);
    assert_eq!(test.balance(&test.treasury), bond);
    assert!(client.get_challenge(&market).is_some());

    client.close_market(&test.creator, &market);
    assert_eq!(client.get_market_state(&market), MarketState::Closed);
    assert_eq!(client.get_challenge(&market).unwrap().challenger, test.carol);
    assert_eq!(client.try_get_proposal(&market), Err(Ok(Error::ProposalNotFound)));
    assert!(client.get_resolution(&market).is_some());
}

#[test]
fn test_challenge_window_closes() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    let evidence = String::from_str(&test.env, "late");

    assert_eq!(
        client.try_challenge_resolution(&test.carol, &market, &evidence),
        Err(Ok(Error::ProposalNotFound))
    );
    test.jump(DAY);
    client.propose_resolution(&test.admin, &market, &1);
    test.jump(client.get_config().challenge_window);
    assert_eq!(
        client.try_challenge_resolution(&test.carol, &market, &evidence),
        Err(Ok(Error::ChallengeWindowClosed))
    );
    assert_eq!(test.balance(&test.carol), FUNDING);
}

#[test]
fn test_challenge_requires_bond_balance() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    let broke = Address::generate(&test.env);

    test.jump(DAY);
    client.propose_resolution(&test.admin, &market, &0);
    assert_eq!(
        client.try_challenge_resolution(&broke, &market, &String::from_str(&test.env, "x")),
        Err(Ok(Error::InsufficientFunds))
    );
    assert_eq!(client.get_proposal(&market).status, ProposalStatus::Pending);
}

// ===== SWEEP AND CLOSE =====

#[test]
fn test_sweep_dust_then_close() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    client.stake_prediction(&test.alice, &market, &0, &1);
    client.stake_prediction(&test.bob, &market, &0, &1);
    client.stake_prediction(&test.carol, &market, &1, &1);

    assert_eq!(
        client.try_close_market(&test.creator, &market),
        Err(Ok(Error::MarketNotResolved))
    );
    client.resolve_market(&test.admin, &market, &Some(0));
    assert_eq!(
        client.try_close_market(&test.creator, &market),
        Err(Ok(Error::VaultNotEmpty))
    );
    assert_eq!(
        client.try_sweep_vault(&test.admin, &market),
        Err(Ok(Error::NotYetEligible))
    );

    assert_eq!(client.claim_reward(&test.alice, &market), 1);
    assert_eq!(client.claim_reward(&test.bob, &market), 1);
    assert_eq!(client.get_vault(&market).balance, 1);

    assert_eq!(
        client.try_sweep_vault(&test.alice, &market),
        Err(Ok(Error::Unauthorized))
    );
    assert_eq!(client.sweep_vault(&test.admin, &market), 1);
    assert_eq!(test.balance(&test.treasury), 1);

    let stranger = Address::generate(&test.env);
    assert_eq!(
        client.try_close_market(&stranger, &market),
        Err(Ok(Error::Unauthorized))
    );
    client.close_market(&test.creator, &market);
    assert_eq!(client.get_market_state(&market), MarketState::Closed);
    assert_eq!(client.try_get_market(&market), Err(Ok(Error::MarketNotFound)));
    assert_eq!(
        client.try_claim_reward(&test.alice, &market),
        Err(Ok(Error::MarketNotFound))
    );
}

#[test]
fn test_sweep_whole_pool_when_nobody_won() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));
    client.stake_prediction(&test.alice, &market, &0, &40);
    client.resolve_market(&test.admin, &market, &Some(1));

    assert_eq!(client.sweep_vault(&test.admin, &market), 40);
    assert_eq!(test.balance(&test.treasury), 40);
    client.close_market(&test.admin, &market);
    assert_eq!(client.get_market_state(&market), MarketState::Closed);
}

// ===== CREATOR TIERS =====

#[test]
fn test_creator_tier_raises_default_fee() {
    let test = ForesightTest::setup();
    let client = test.client();

    let first = test.create_market(None);
    assert_eq!(client.get_market(&first).creator_fee_bps, 150);
    for _ in 0..4 {
        test.create_market(None);
    }

    assert_eq!(
        client.try_update_creator_tier(&test.alice, &test.creator),
        Err(Ok(Error::Unauthorized))
    );
    assert_eq!(client.update_creator_tier(&test.admin, &test.creator), 1);
    assert_eq!(client.update_creator_tier(&test.admin, &test.creator), 1);

    let sixth = test.create_market(None);
    assert_eq!(client.get_market(&sixth).creator_fee_bps, 200);
    assert_eq!(
        client.try_update_creator_tier(&test.admin, &test.alice),
        Err(Ok(Error::ProfileNotFound))
    );
}

// ===== PROTOCOL STATS =====

#[test]
fn test_update_protocol_stats_is_idempotent() {
    let test = ForesightTest::setup();
    let client = test.client();
    let m0 = test.create_market(Some(0));
    let m1 = test.create_market(Some(0));
    client.stake_prediction(&test.alice, &m0, &0, &100);
    client.stake_prediction(&test.bob, &m1, &1, &50);

    test.env.as_contract(&test.contract_id, || {
        LedgerStore::set(&test.env, &DataKey::ProtocolStats, &ProtocolStats::default());
    });

    let markets = vec![&test.env, m0.clone(), m1.clone(), m0.clone()];
    let stats = client.update_protocol_stats(&test.admin, &markets);
    assert_eq!(stats.total_markets, 2);
    assert_eq!(stats.total_stakes, 2);
    assert_eq!(stats.total_volume, 150);

    let again = client.update_protocol_stats(&test.admin, &markets);
    assert_eq!(again, stats);

    // a partial list never lowers the counters
    let partial = client.update_protocol_stats(&test.admin, &vec![&test.env, m1]);
    assert_eq!(partial, stats);
}

// ===== ADDRESSING =====

#[test]
fn test_derive_location() {
    let test = ForesightTest::setup();
    let client = test.client();
    let market = test.create_market(Some(0));

    let a = client.derive_location(&DataKey::Market(market.clone()));
    let b = client.derive_location(&DataKey::Market(market.clone()));
    let vault = client.derive_location(&DataKey::MarketVault(market.clone()));
    let prediction = client.derive_location(&DataKey::Prediction(market, test.alice.clone()));
    assert_eq!(a, b);
    assert_ne!(a, vault);
    assert_ne!(vault, prediction);
}
