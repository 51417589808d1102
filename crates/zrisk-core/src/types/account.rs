//! Loan account records.
//!
//! Accounts are owned by the caller and read-only to the engine.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EclError, EclResult};

/// Product tag used when the account carries no explicit product type.
pub const DEFAULT_PRODUCT: &str = "default";

/// Contractual interest rate of an account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterestRate {
    /// Fixed nominal rate.
    Fixed {
        /// Annual nominal rate (0.06 = 6%).
        rate: f64,
        /// Compounding periods per year.
        compounding_frequency: u32,
    },
    /// Spread over a scenario base rate.
    Floating {
        /// Annual nominal spread.
        spread: f64,
        /// Compounding periods per year.
        compounding_frequency: u32,
    },
}

impl InterestRate {
    /// Fixed rate compounded monthly.
    #[must_use]
    pub fn fixed(rate: f64) -> Self {
        Self::Fixed {
            rate,
            compounding_frequency: 12,
        }
    }

    /// Floating spread compounded monthly.
    #[must_use]
    pub fn floating(spread: f64) -> Self {
        Self::Floating {
            spread,
            compounding_frequency: 12,
        }
    }

    /// Returns true for floating-rate accounts.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        matches!(self, Self::Floating { .. })
    }
}

impl Default for InterestRate {
    fn default() -> Self {
        Self::fixed(0.0)
    }
}

/// Static per-loan attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier.
    pub id: String,
    /// Product tag selecting the exposure and loss policies.
    pub product: String,
    /// Drawn balance at the observation date.
    pub outstanding_balance: f64,
    /// Facility limit for revolving products.
    pub limit: Option<f64>,
    /// Contractual interest rate.
    pub interest_rate: InterestRate,
    /// Remaining contractual lifetime in monthly periods.
    pub remaining_term: usize,
    /// Months between contractual payments.
    pub payment_interval: usize,
    /// Collateral value at the observation date.
    pub collateral_value: Option<f64>,
    /// Watchlist flag.
    pub watchlist: bool,
    /// Rating state at origination.
    pub origination_state: String,
    /// Rating state at the observation date.
    pub current_state: String,
    /// Observation (reporting) date.
    pub reporting_date: Option<NaiveDate>,
}

impl Account {
    /// Starts building an account.
    #[must_use]
    pub fn builder(id: impl Into<String>) -> AccountBuilder {
        AccountBuilder::new(id)
    }

    /// Undrawn commitment, zero when there is no limit.
    #[must_use]
    pub fn undrawn(&self) -> f64 {
        self.limit
            .map_or(0.0, |limit| (limit - self.outstanding_balance).max(0.0))
    }

    /// Returns true if `period` (1-based) is a contractual payment date.
    ///
    /// Payment dates are counted back from maturity, so the final period always pays.
    #[must_use]
    pub fn is_payment_period(&self, period: usize) -> bool {
        period >= 1
            && period <= self.remaining_term
            && (self.remaining_term - period) % self.payment_interval == 0
    }
}

/// Whole months from `from` to `to`, ignoring the day of month.
#[must_use]
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
}

/// Builder for [`Account`].
#[derive(Debug, Clone)]
pub struct AccountBuilder {
    id: String,
    product: String,
    outstanding_balance: Option<f64>,
    limit: Option<f64>,
    interest_rate: InterestRate,
    remaining_term: Option<usize>,
    maturity_date: Option<NaiveDate>,
    payment_interval: usize,
    collateral_value: Option<f64>,
    watchlist: bool,
    origination_state: Option<String>,
    current_state: Option<String>,
    reporting_date: Option<NaiveDate>,
}

impl AccountBuilder {
    /// Creates a builder for the given account id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            product: DEFAULT_PRODUCT.to_string(),
            outstanding_balance: None,
            limit: None,
            interest_rate: InterestRate::default(),
            remaining_term: None,
            maturity_date: None,
            payment_interval: 1,
            collateral_value: None,
            watchlist: false,
            origination_state: None,
            current_state: None,
            reporting_date: None,
        }
    }

    /// Sets the product tag.
    #[must_use]
    pub fn product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    /// Sets the outstanding balance.
    #[must_use]
    pub fn balance(mut self, balance: f64) -> Self {
        self.outstanding_balance = Some(balance);
        self
    }

    /// Sets the facility limit.
    #[must_use]
    pub fn limit(mut self, limit: f64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the interest rate.
    #[must_use]
    pub fn interest_rate(mut self, rate: InterestRate) -> Self {
        self.interest_rate = rate;
        self
    }

    /// Sets the remaining term in monthly periods.
    #[must_use]
    pub fn remaining_term(mut self, periods: usize) -> Self {
        self.remaining_term = Some(periods);
        self
    }

    /// Derives the remaining term from the reporting and maturity dates.
    #[must_use]
    pub fn dates(mut self, reporting: NaiveDate, maturity: NaiveDate) -> Self {
        self.reporting_date = Some(reporting);
        self.maturity_date = Some(maturity);
        self
    }

    /// Sets the number of months between contractual payments.
    #[must_use]
    pub fn payment_interval(mut self, months: usize) -> Self {
        self.payment_interval = months;
        self
    }

    /// Sets the collateral value.
    #[must_use]
    pub fn collateral_value(mut self, value: f64) -> Self {
        self.collateral_value = Some(value);
        self
    }

    /// Sets the watchlist flag.
    #[must_use]
    pub fn watchlist(mut self, watchlist: bool) -> Self {
        self.watchlist = watchlist;
        self
    }

    /// Sets the current rating state; also the origination state unless set separately.
    #[must_use]
    pub fn current_state(mut self, state: impl Into<String>) -> Self {
        self.current_state = Some(state.into());
        self
    }

    /// Sets the origination rating state.
    #[must_use]
    pub fn origination_state(mut self, state: impl Into<String>) -> Self {
        self.origination_state = Some(state.into());
        self
    }

    /// Builds the account.
    pub fn build(self) -> EclResult<Account> {
        let fail = |reason: &str| EclError::configuration(reason).with_account(self.id.clone());

        let outstanding_balance = self
            .outstanding_balance
            .ok_or_else(|| fail("outstanding balance is required"))?;
        if !outstanding_balance.is_finite() || outstanding_balance < 0.0 {
            return Err(fail("outstanding balance must be finite and non-negative"));
        }
        if self.limit.is_some_and(|l| !l.is_finite() || l < 0.0) {
            return Err(fail("limit must be finite and non-negative"));
        }
        if self
            .collateral_value
            .is_some_and(|c| !c.is_finite() || c < 0.0)
        {
            return Err(fail("collateral value must be finite and non-negative"));
        }
        if self.payment_interval == 0 {
            return Err(fail("payment interval must be at least one month"));
        }

        let remaining_term = match (self.remaining_term, self.reporting_date, self.maturity_date) {
            (Some(term), _, _) => term,
            (None, Some(reporting), Some(maturity)) => {
                usize::try_from(months_between(reporting, maturity).max(1)).unwrap_or(1)
            }
            _ => return Err(fail("remaining term or reporting/maturity dates are required")),
        };
        if remaining_term == 0 {
            return Err(fail("remaining term must be at least one period"));
        }

        let current_state = self
            .current_state
            .ok_or_else(|| fail("current rating state is required"))?;
        let origination_state = self
            .origination_state
            .unwrap_or_else(|| current_state.clone());

        Ok(Account {
            id: self.id,
            product: self.product,
            outstanding_balance,
            limit: self.limit,
            interest_rate: self.interest_rate,
            remaining_term,
            payment_interval: self.payment_interval,
            collateral_value: self.collateral_value,
            watchlist: self.watchlist,
            origination_state,
            current_state,
            reporting_date: self.reporting_date,
        })
    }
}
