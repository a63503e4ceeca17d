//! Present-value pricing for zero-coupon and coupon bonds.
//!
//! Every valuation returns a [`ValuationResult`]: the present value plus a
//! timeline of cash flows laid out along a period axis. Rendering the timeline
//! is left to a [`ChartRenderer`](crate::core::chart::ChartRenderer).
use crate::core::error::{Result, SandboxError};
use crate::core::validate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compounding {
    Annual,
    SemiAnnual,
}

impl Compounding {
    pub fn from_yearly(yearly: bool) -> Self {
        if yearly {
            Compounding::Annual
        } else {
            Compounding::SemiAnnual
        }
    }

    pub fn periods_per_year(&self) -> u32 {
        match self {
            Compounding::Annual => 1,
            Compounding::SemiAnnual => 2,
        }
    }
}

impl Display for Compounding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Compounding::Annual => "Annual",
                Compounding::SemiAnnual => "Semi-Annual",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BondKind {
    Zero,
    Coupon {
        coupon_rate: f64,
        compounding: Compounding,
    },
}

/// Bond parameters. Rates are decimals (0.1 for 10%), maturity is in years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondSpec {
    pub par: f64,
    pub discount_rate: f64,
    pub maturity: u32,
    pub kind: BondKind,
}

impl BondSpec {
    pub fn zero(par: f64, discount_rate: f64, maturity: u32) -> Self {
        BondSpec {
            par,
            discount_rate,
            maturity,
            kind: BondKind::Zero,
        }
    }

    pub fn coupon(
        par: f64,
        coupon_rate: f64,
        discount_rate: f64,
        maturity: u32,
        compounding: Compounding,
    ) -> Self {
        BondSpec {
            par,
            discount_rate,
            maturity,
            kind: BondKind::Coupon {
                coupon_rate,
                compounding,
            },
        }
    }

    pub fn value(&self) -> Result<ValuationResult> {
        match self.kind {
            BondKind::Zero => value_zero_bond(self.par, self.discount_rate, self.maturity),
            BondKind::Coupon {
                coupon_rate,
                compounding,
            } => value_coupon_bond(
                self.par,
                coupon_rate,
                self.discount_rate,
                self.maturity,
                compounding == Compounding::Annual,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineAxis {
    Years,
    Periods,
}

impl Display for TimelineAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TimelineAxis::Years => "Years",
                TimelineAxis::Periods => "Periods",
            }
        )
    }
}

/// A single marker on the valuation timeline.
///
/// `emphasis_level` only drives visual grouping (stem height); it carries no
/// financial meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    pub period_index: u32,
    pub amount: f64,
    pub amount_label: String,
    pub emphasis_level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub title: String,
    pub axis: TimelineAxis,
    pub present_value: f64,
    pub timeline: Vec<CashFlowPoint>,
}

fn format_rate(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// Discounts a single amount `periods` periods back at `rate` per period.
fn discount(amount: f64, rate: f64, periods: u32) -> f64 {
    amount / (1.0 + rate).powf(f64::from(periods))
}

/// Present value of an ordinary annuity paying `payment` at the end of each period.
fn annuity(payment: f64, rate: f64, periods: u32) -> f64 {
    payment / rate * (1.0 - 1.0 / (1.0 + rate).powf(f64::from(periods)))
}

/// Values a zero-coupon bond paying `par` at `maturity` years.
pub fn value_zero_bond(par: f64, discount_rate: f64, maturity: u32) -> Result<ValuationResult> {
    let par = validate::positive_amount("par", par)?;
    let discount_rate = validate::unit_rate("discount rate", discount_rate)?;
    let maturity = validate::maturity(maturity)?;

    let present_value = discount(par, discount_rate, maturity);
    debug!(par, discount_rate, maturity, present_value, "Valued zero bond");

    let timeline = (0..=maturity)
        .map(|index| {
            if index == 0 {
                CashFlowPoint {
                    period_index: index,
                    amount: present_value,
                    amount_label: format!("Present value: {present_value:.2}"),
                    emphasis_level: 1,
                }
            } else if index == maturity {
                CashFlowPoint {
                    period_index: index,
                    amount: par,
                    amount_label: format!("Face value at maturity: {par:.2}"),
                    emphasis_level: 2,
                }
            } else {
                CashFlowPoint {
                    period_index: index,
                    amount: 0.0,
                    amount_label: String::new(),
                    emphasis_level: 0,
                }
            }
        })
        .collect();

    Ok(ValuationResult {
        title: format!(
            "Zero bond valuation timeline\nPar: {par:.2}, Maturity (Y): {maturity}, Discount rate: {}",
            format_rate(discount_rate)
        ),
        axis: TimelineAxis::Years,
        present_value,
        timeline,
    })
}

/// Values a bond paying periodic coupons plus `par` at maturity.
///
/// With `yearly` set, coupons are paid and discounted annually; otherwise both
/// the coupon and the discount rate are halved over twice as many periods.
pub fn value_coupon_bond(
    par: f64,
    coupon_rate: f64,
    discount_rate: f64,
    maturity: u32,
    yearly: bool,
) -> Result<ValuationResult> {
    let par = validate::positive_amount("par", par)?;
    let coupon_rate = validate::unit_rate("coupon rate", coupon_rate)?;
    let discount_rate = validate::unit_rate("discount rate", discount_rate)?;
    let maturity = validate::maturity(maturity)?;

    let compounding = Compounding::from_yearly(yearly);
    let per_year = compounding.periods_per_year();
    let periods = maturity * per_year;
    let periodic_rate = discount_rate / per_year as f64;
    let periodic_coupon = par * coupon_rate / per_year as f64;

    if periodic_rate <= 0.0 {
        return Err(SandboxError::invalid_input(
            "discount rate must be positive to value coupon payments",
        ));
    }

    let face_value_pv = discount(par, periodic_rate, periods);
    let coupons_pv = annuity(periodic_coupon, periodic_rate, periods);
    let present_value = face_value_pv + coupons_pv;
    debug!(
        face_value_pv,
        coupons_pv, periods, periodic_rate, "Valued coupon bond"
    );

    let timeline = (0..=periods)
        .map(|index| {
            if index == 0 {
                CashFlowPoint {
                    period_index: index,
                    amount: present_value,
                    amount_label: format!("Present value: {present_value:.2}"),
                    emphasis_level: 2,
                }
            } else if index == periods {
                let final_payment = par + periodic_coupon;
                CashFlowPoint {
                    period_index: index,
                    amount: final_payment,
                    amount_label: format!("Face value + coupon: {final_payment:.2}"),
                    emphasis_level: 3,
                }
            } else {
                CashFlowPoint {
                    period_index: index,
                    amount: periodic_coupon,
                    amount_label: format!("Coupon: {periodic_coupon:.2}"),
                    emphasis_level: 1,
                }
            }
        })
        .collect();

    Ok(ValuationResult {
        title: format!(
            "Coupon bond valuation timeline\nPar: {par:.2}, Maturity (Y): {maturity}, Coupon rate: {}, Discount rate: {}, Compounding: {compounding}",
            format_rate(coupon_rate),
            format_rate(discount_rate),
        ),
        axis: TimelineAxis::Periods,
        present_value,
        timeline,
    })
}
