// libs/scheduling-cell/src/services/pricing.rs
use shared_config::AppConfig;

use crate::models::PricingQuote;

/// Consultation rates. Kept out of the quote itself so the calculator stays
/// a pure function of (affiliation, specialty).
#[derive(Debug, Clone)]
pub struct PricingRates {
    pub base: f64,
    pub premium: f64,
}

impl PricingRates {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base: config.base_consultation_fee,
            premium: config.specialty_consultation_fee,
        }
    }
}

impl Default for PricingRates {
    fn default() -> Self {
        Self {
            base: 500.0,
            premium: 1500.0,
        }
    }
}

/// Derive the consultation cost. Affiliated patients pay nothing; general
/// medicine carries the base rate; every other specialty is premium.
pub fn price(rates: &PricingRates, afiliado: bool, especialidad: &str) -> f64 {
    if afiliado {
        return 0.0;
    }
    if is_general_medicine(especialidad) {
        rates.base
    } else {
        rates.premium
    }
}

pub fn quote(rates: &PricingRates, afiliado: bool, especialidad: &str) -> PricingQuote {
    PricingQuote {
        afiliado,
        especialidad: especialidad.to_string(),
        monto: price(rates, afiliado, especialidad),
    }
}

fn is_general_medicine(especialidad: &str) -> bool {
    let normalized = especialidad.trim().to_lowercase();
    normalized == "medicina general" || normalized == "general"
}
