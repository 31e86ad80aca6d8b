use crate::errors::{helpers, Error};
use crate::types::{Market, PayoutQuote};
use crate::utils::NumericUtils;

// ===== FEE CONSTANTS =====

/// Default creator fee per tier, in basis points.
pub const TIER_DEFAULT_FEE_BPS: [u32; 4] = [150, 200, 250, 300];

// ===== FEE CALCULATOR =====

/// Fee and payout arithmetic. Everything here is pure so it can be shared by
/// market creation, claims and the read-only `quote_payout` entry point.
pub struct FeeCalculator;

impl FeeCalculator {
    pub fn tier_default_fee_bps(tier: u32) -> u32 {
        let index = (tier as usize).min(TIER_DEFAULT_FEE_BPS.len() - 1);
        TIER_DEFAULT_FEE_BPS[index]
    }

    /// Explicit fees must fit under the cap. Omitted fees fall back to the
    /// tier default, clamped to the cap.
    pub fn resolve_creator_fee_bps(
        explicit: Option<u32>,
        tier: u32,
        cap_bps: u32,
    ) -> Result<u32, Error> {
        match explicit {
            Some(fee_bps) => {
                helpers::require_fee_bps(fee_bps, cap_bps)?;
                Ok(fee_bps)
            }
            None => Ok(Self::tier_default_fee_bps(tier).min(cap_bps)),
        }
    }

    pub fn creator_fee(market: &Market) -> Result<i128, Error> {
        NumericUtils::apply_bps(market.total_pool, market.creator_fee_bps)
    }

    pub fn protocol_fee(market: &Market) -> Result<i128, Error> {
        NumericUtils::apply_bps(market.total_pool, market.protocol_fee_bps)
    }

    pub fn distributable(market: &Market) -> Result<i128, Error> {
        let fees = NumericUtils::checked_add(Self::creator_fee(market)?, Self::protocol_fee(market)?)?;
        NumericUtils::checked_sub(market.total_pool, fees)
    }

    /// Pro-rata split for a winning stake of `amount`.
    ///
    /// The winner's share of the distributable pool and its share of each fee
    /// are all computed against the winning-side total `W`.
    pub fn quote(market: &Market, amount: i128) -> Result<PayoutQuote, Error> {
        let winning_stake = market.winning_stake().ok_or(Error::MarketNotResolved)?;
        if winning_stake <= 0 || amount <= 0 {
            return Ok(PayoutQuote::default());
        }

        Ok(PayoutQuote {
            payout: NumericUtils::mul_div(amount, Self::distributable(market)?, winning_stake)?,
            creator_cut: NumericUtils::mul_div(amount, Self::creator_fee(market)?, winning_stake)?,
            protocol_cut: NumericUtils::mul_div(amount, Self::protocol_fee(market)?, winning_stake)?,
        })
    }

    /// Limit a quote to what the vault still holds. The claimant is paid
    /// first, then the creator, then the treasury.
    pub fn cap_to_balance(quote: PayoutQuote, balance: i128) -> PayoutQuote {
        let mut remaining = balance.max(0);
        let payout = quote.payout.min(remaining);
        remaining -= payout;
        let creator_cut = quote.creator_cut.min(remaining);
        remaining -= creator_cut;
        let protocol_cut = quote.protocol_cut.min(remaining);
        PayoutQuote {
            payout,
            creator_cut,
            protocol_cut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ONE_TOKEN;
    use crate::types::{MarketId, MarketType};
    use soroban_sdk::{testutils::Address as _, vec, Address, Env, String};

    fn resolved_market(env: &Env, stakes: [i128; 2], creator_bps: u32, protocol_bps: u32) -> Market {
        let creator = Address::generate(env);
        Market {
            id: MarketId {
                creator: creator.clone(),
                index: 0,
            },
            question: String::from_str(env, "Q"),
            outcomes: vec![env, String::from_str(env, "A"), String::from_str(env, "B")],
            market_type: MarketType::OpenEnded,
            deadline: None,
            ai_score: 0,
            ai_classification: 0,
            ai_resolvable: false,
            resolver_authority: creator,
            metadata: String::from_str(env, ""),
            creator_fee_bps: creator_bps,
            protocol_fee_bps: protocol_bps,
            token: Address::generate(env),
            total_pool: stakes[0] + stakes[1],
            stakes_per_outcome: vec![env, stakes[0], stakes[1]],
            staker_count: 2,
            resolved: true,
            winning_outcome: Some(0),
            claimed_winning_stake: 0,
            created_at: 0,
        }
    }

    #[test]
    fn test_tier_defaults() {
        assert_eq!(FeeCalculator::tier_default_fee_bps(0), 150);
        assert_eq!(FeeCalculator::tier_default_fee_bps(3), 300);
        assert_eq!(FeeCalculator::tier_default_fee_bps(9), 300);
    }

    #[test]
    fn test_resolve_creator_fee() {
        assert_eq!(FeeCalculator::resolve_creator_fee_bps(None, 0, 1_000), Ok(150));
        assert_eq!(FeeCalculator::resolve_creator_fee_bps(None, 3, 200), Ok(200));
        assert_eq!(FeeCalculator::resolve_creator_fee_bps(Some(0), 3, 1_000), Ok(0));
        assert_eq!(
            FeeCalculator::resolve_creator_fee_bps(Some(1_001), 0, 1_000),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn test_quote_without_fees_pays_whole_pool() {
        let env = Env::default();
        let market = resolved_market(&env, [100, 50], 0, 0);
        let quote = FeeCalculator::quote(&market, 100).unwrap();

        assert_eq!(quote.payout, 150);
        assert_eq!(quote.creator_cut + quote.protocol_cut, 0);
    }

    #[test]
    fn test_quote_with_creator_fee() {
        let env = Env::default();
        let market = resolved_market(&env, [50 * ONE_TOKEN / 10, 30 * ONE_TOKEN / 10], 500, 0);

        // 5 + 3 tokens staked, 5% creator fee on 8 tokens
        let quote = FeeCalculator::quote(&market, 50_000_000).unwrap();
        assert_eq!(quote.payout, 76_000_000);
        assert_eq!(quote.creator_cut, 4_000_000);
        assert_eq!(quote.protocol_cut, 0);
    }

    #[test]
    fn test_quote_splits_fees_between_winners() {
        let env = Env::default();
        let market = resolved_market(&env, [300, 700], 300, 150);

        let first = FeeCalculator::quote(&market, 100).unwrap();
        let second = FeeCalculator::quote(&market, 200).unwrap();
        assert_eq!(first.creator_cut + second.creator_cut, 30);
        assert_eq!(first.protocol_cut + second.protocol_cut, 15);
        let paid = first.payout + second.payout;
        assert_eq!(paid, 100 * 955 / 300 + 200 * 955 / 300);
        assert!(paid + 45 <= market.total_pool);
    }

    #[test]
    fn test_quote_requires_resolution() {
        let env = Env::default();
        let mut market = resolved_market(&env, [10, 10], 0, 0);
        market.winning_outcome = None;
        assert_eq!(FeeCalculator::quote(&market, 10), Err(Error::MarketNotResolved));
    }

    #[test]
    fn test_cap_to_balance_pays_claimant_first() {
        let quote = PayoutQuote {
            payout: 90,
            creator_cut: 6,
            protocol_cut: 4,
        };
        let capped = FeeCalculator::cap_to_balance(quote.clone(), 93);
        assert_eq!(capped.payout, 90);
        assert_eq!(capped.creator_cut, 3);
        assert_eq!(capped.protocol_cut, 0);
        assert_eq!(FeeCalculator::cap_to_balance(quote.clone(), 1_000), quote);
    }
}
