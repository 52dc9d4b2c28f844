//! Black-Scholes delta for feeds that omit greeks.
//!
//! Yahoo's option chains carry implied volatility but no delta. With
//! `estimate_missing_delta` enabled the adapter fills it in from the
//! contract's own IV, so the delta rule has something to check.

use statrs::function::erf::erf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSide {
    Put,
    Call,
}

/// Standard normal CDF: Φ(x) = 0.5 * (1 + erf(x / sqrt(2)))
fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / f64::sqrt(2.0)))
}

/// European delta with no dividends.
///
/// Returns `None` when any input makes the formula meaningless (non-positive
/// spot, strike, volatility or time).
pub fn black_scholes_delta(
    side: OptionSide,
    spot: f64,
    strike: f64,
    years: f64,
    volatility: f64,
    rate: f64,
) -> Option<f64> {
    if !(spot > 0.0 && strike > 0.0 && years > 0.0 && volatility > 0.0) {
        return None;
    }

    let vol_sqrt_t = volatility * years.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * volatility * volatility) * years) / vol_sqrt_t;
    if !d1.is_finite() {
        return None;
    }

    let call_delta = norm_cdf(d1);
    Some(match side {
        OptionSide::Call => call_delta,
        OptionSide::Put => call_delta - 1.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_atm_call_delta_above_half() {
        let delta = black_scholes_delta(OptionSide::Call, 100.0, 100.0, 0.25, 0.30, 0.04).unwrap();
        // d1 = (0 + (0.04 + 0.045) * 0.25) / 0.15 = 0.141667
        assert_relative_eq!(delta, 0.5563, epsilon = 1e-3);
    }

    #[test]
    fn test_put_call_parity_of_delta() {
        let call = black_scholes_delta(OptionSide::Call, 100.0, 90.0, 0.1, 0.4, 0.04).unwrap();
        let put = black_scholes_delta(OptionSide::Put, 100.0, 90.0, 0.1, 0.4, 0.04).unwrap();
        assert_relative_eq!(call - put, 1.0, epsilon = 1e-12);
        assert!(put < 0.0 && put > -0.5);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(black_scholes_delta(OptionSide::Put, 100.0, 90.0, 0.0, 0.4, 0.04).is_none());
        assert!(black_scholes_delta(OptionSide::Put, 100.0, 90.0, 0.1, 0.0, 0.04).is_none());
        assert!(black_scholes_delta(OptionSide::Put, 0.0, 90.0, 0.1, 0.4, 0.04).is_none());
    }
}
