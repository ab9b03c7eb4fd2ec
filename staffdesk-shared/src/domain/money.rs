/// Money value objects
///
/// Amounts are [`rust_decimal::Decimal`] values rounded to two decimal places
/// and tagged with a whitelisted [`Currency`]. All arithmetic is checked:
/// mixing currencies, producing a negative amount or exceeding [`MAX_AMOUNT`]
/// fails with a [`DomainError`] instead of panicking.
///
/// # Types
///
/// - [`Money`]: non-negative amount + currency, base of everything else
/// - [`Salary`]: an employee's contractual pay, strictly positive
/// - [`GrossSalary`]: payroll gross amount, strictly positive
/// - [`NetSalary`]: gross minus deductions, never negative
/// - [`Deductions`]: taxes, social security and health insurance
///
/// # Example
///
/// ```
/// use staffdesk_shared::domain::money::{Currency, Deductions, GrossSalary, NetSalary};
/// use rust_decimal::Decimal;
///
/// # fn example() -> Result<(), staffdesk_shared::domain::DomainError> {
/// let gross = GrossSalary::new(Decimal::new(300000, 2), Currency::Eur)?;
/// let deductions = Deductions::standard_for(&gross)?;
/// let net = NetSalary::compute(&gross, &deductions)?;
/// assert_eq!(net.amount(), Decimal::new(202500, 2));
/// # Ok(())
/// # }
/// ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Number of decimal places kept for every amount
pub const SCALE: u32 = 2;

/// Largest amount a `NUMERIC(12, 2)` column holds
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, SCALE);

/// Default income tax rate (percent of gross)
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Default social security rate (percent of gross)
pub const DEFAULT_SOCIAL_SECURITY_RATE: Decimal = Decimal::from_parts(75, 0, 0, false, 1);

/// Default health insurance rate (percent of gross)
pub const DEFAULT_HEALTH_INSURANCE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Supported currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
    Gbp,
}

impl Currency {
    /// All supported currencies
    pub const ALL: [Currency; 3] = [Currency::Eur, Currency::Usd, Currency::Gbp];

    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
        }
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            "GBP" => Ok(Currency::Gbp),
            _ => Err(DomainError::UnsupportedCurrency(s.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn normalize(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Non-negative amount of a single currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new amount, rejecting negatives and anything above [`MAX_AMOUNT`]
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, DomainError> {
        let amount = normalize(amount);
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::NegativeAmount(amount));
        }
        if amount > MAX_AMOUNT {
            return Err(DomainError::AmountOutOfRange);
        }
        Ok(Self {
            amount: amount.abs(),
            currency,
        })
    }

    /// Parses the currency code and builds the amount
    pub fn parse(amount: Decimal, currency: &str) -> Result<Self, DomainError> {
        Self::new(amount, currency.parse()?)
    }

    /// Zero in the given currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch {
                left: self.currency.code().to_string(),
                right: other.currency.code().to_string(),
            });
        }
        Ok(())
    }

    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        self.ensure_same_currency(other)?;
        let sum = self
            .amount
            .checked_add(other.amount)
            .ok_or(DomainError::AmountOutOfRange)?;
        Money::new(sum, self.currency)
    }

    /// Subtracts `other`; fails if the result would be negative
    pub fn subtract(&self, other: &Money) -> Result<Money, DomainError> {
        self.ensure_same_currency(other)?;
        let difference = self
            .amount
            .checked_sub(other.amount)
            .ok_or(DomainError::AmountOutOfRange)?;
        Money::new(difference, self.currency)
    }

    pub fn multiply(&self, factor: Decimal) -> Result<Money, DomainError> {
        if factor.is_sign_negative() && !factor.is_zero() {
            return Err(DomainError::InvalidFactor(factor));
        }
        let product = self
            .amount
            .checked_mul(factor)
            .ok_or(DomainError::AmountOutOfRange)?;
        Money::new(product, self.currency)
    }

    /// `percent` percent of this amount (`20` means 20%)
    pub fn percentage_of(&self, percent: Decimal) -> Result<Money, DomainError> {
        if percent.is_sign_negative() && !percent.is_zero() {
            return Err(DomainError::InvalidFactor(percent));
        }
        let share = self
            .amount
            .checked_mul(percent)
            .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
            .ok_or(DomainError::AmountOutOfRange)?;
        Money::new(share, self.currency)
    }

    pub fn greater_than(&self, other: &Money) -> Result<bool, DomainError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount > other.amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

fn positive(amount: Decimal, currency: Currency) -> Result<Money, DomainError> {
    let money = Money::new(amount, currency)?;
    if money.is_zero() {
        return Err(DomainError::NonPositiveAmount(money.amount));
    }
    Ok(money)
}

/// Contractual pay of an employee (strictly positive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Salary(Money);

impl Salary {
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, DomainError> {
        positive(amount, currency).map(Self)
    }

    pub fn parse(amount: Decimal, currency: &str) -> Result<Self, DomainError> {
        Self::new(amount, currency.parse()?)
    }

    pub fn money(&self) -> Money {
        self.0
    }

    pub fn amount(&self) -> Decimal {
        self.0.amount()
    }

    pub fn currency(&self) -> Currency {
        self.0.currency()
    }

    /// Gross amount of a payroll run paying this salary
    pub fn to_gross(&self) -> GrossSalary {
        GrossSalary(self.0)
    }
}

/// Gross amount of a payroll (strictly positive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GrossSalary(Money);

impl GrossSalary {
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, DomainError> {
        positive(amount, currency).map(Self)
    }

    pub fn money(&self) -> Money {
        self.0
    }

    pub fn amount(&self) -> Decimal {
        self.0.amount()
    }

    pub fn currency(&self) -> Currency {
        self.0.currency()
    }

    pub fn add(&self, other: &GrossSalary) -> Result<GrossSalary, DomainError> {
        self.0.add(&other.0).map(Self)
    }

    pub fn multiply(&self, factor: Decimal) -> Result<GrossSalary, DomainError> {
        let money = self.0.multiply(factor)?;
        positive(money.amount(), money.currency()).map(Self)
    }

    pub fn percentage_of(&self, percent: Decimal) -> Result<Money, DomainError> {
        self.0.percentage_of(percent)
    }
}

/// Net amount paid out after deductions (never negative)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NetSalary(Money);

impl NetSalary {
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, DomainError> {
        Money::new(amount, currency).map(Self)
    }

    /// Gross minus the deductions total
    pub fn compute(gross: &GrossSalary, deductions: &Deductions) -> Result<Self, DomainError> {
        let total = deductions.total()?;
        gross.0.ensure_same_currency(&total)?;
        if total.amount() > gross.amount() {
            return Err(DomainError::DeductionsExceedGross {
                gross: gross.amount(),
                deductions: total.amount(),
            });
        }
        gross.0.subtract(&total).map(Self)
    }

    pub fn money(&self) -> Money {
        self.0
    }

    pub fn amount(&self) -> Decimal {
        self.0.amount()
    }

    pub fn currency(&self) -> Currency {
        self.0.currency()
    }
}

/// Payroll deductions, all in the same currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deductions {
    taxes: Money,
    social_security: Money,
    health_insurance: Money,
}

impl Deductions {
    pub fn new(
        taxes: Decimal,
        social_security: Decimal,
        health_insurance: Decimal,
        currency: Currency,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            taxes: Money::new(taxes, currency)?,
            social_security: Money::new(social_security, currency)?,
            health_insurance: Money::new(health_insurance, currency)?,
        })
    }

    /// No deductions at all
    pub fn none(currency: Currency) -> Self {
        Self {
            taxes: Money::zero(currency),
            social_security: Money::zero(currency),
            health_insurance: Money::zero(currency),
        }
    }

    /// Deductions at the default rates
    pub fn standard_for(gross: &GrossSalary) -> Result<Self, DomainError> {
        Ok(Self {
            taxes: gross.percentage_of(DEFAULT_TAX_RATE)?,
            social_security: gross.percentage_of(DEFAULT_SOCIAL_SECURITY_RATE)?,
            health_insurance: gross.percentage_of(DEFAULT_HEALTH_INSURANCE_RATE)?,
        })
    }

    pub fn taxes(&self) -> Money {
        self.taxes
    }

    pub fn social_security(&self) -> Money {
        self.social_security
    }

    pub fn health_insurance(&self) -> Money {
        self.health_insurance
    }

    pub fn currency(&self) -> Currency {
        self.taxes.currency()
    }

    /// Sum of all three components
    pub fn total(&self) -> Result<Money, DomainError> {
        self.taxes
            .add(&self.social_security)?
            .add(&self.health_insurance)
    }

    pub fn add(&self, other: &Deductions) -> Result<Deductions, DomainError> {
        Ok(Self {
            taxes: self.taxes.add(&other.taxes)?,
            social_security: self.social_security.add(&other.social_security)?,
            health_insurance: self.health_insurance.add(&other.health_insurance)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn eur(cents: i64) -> Money {
        Money::new(Decimal::new(cents, 2), Currency::Eur).unwrap()
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("EUR".parse::<Currency>().unwrap(), Currency::Eur);
        assert_eq!(" usd ".parse::<Currency>().unwrap(), Currency::Usd);
        assert!(matches!(
            "JPY".parse::<Currency>(),
            Err(DomainError::UnsupportedCurrency(_))
        ));
    }

    #[test]
    fn test_money_rejects_negative() {
        let result = Money::new(Decimal::new(-1, 2), Currency::Eur);
        assert!(matches!(result, Err(DomainError::NegativeAmount(_))));
    }

    #[test]
    fn test_money_rounds_to_cents() {
        let money = Money::new(Decimal::new(10005, 3), Currency::Eur).unwrap();
        assert_eq!(money.amount(), Decimal::new(1001, 2));
    }

    #[test]
    fn test_money_equality_is_by_value() {
        let a = Money::new(Decimal::new(100, 0), Currency::Eur).unwrap();
        let b = Money::new(Decimal::new(10000, 2), Currency::Eur).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Money::new(Decimal::new(100, 0), Currency::Usd).unwrap());
    }

    #[test]
    fn test_subtract_below_zero_fails() {
        let result = eur(100).subtract(&eur(200));
        assert!(matches!(result, Err(DomainError::NegativeAmount(_))));
    }

    #[test]
    fn test_currency_mismatch() {
        let usd = Money::new(Decimal::ONE, Currency::Usd).unwrap();
        assert!(matches!(
            eur(100).add(&usd),
            Err(DomainError::CurrencyMismatch { .. })
        ));
        assert!(eur(100).subtract(&usd).is_err());
        assert!(eur(100).greater_than(&usd).is_err());
    }

    #[test]
    fn test_multiply_and_percentage() {
        assert_eq!(eur(1000).multiply(Decimal::new(15, 1)).unwrap(), eur(1500));
        assert_eq!(
            eur(300000).percentage_of(Decimal::new(75, 1)).unwrap(),
            eur(22500)
        );
        assert!(matches!(
            eur(100).multiply(Decimal::NEGATIVE_ONE),
            Err(DomainError::InvalidFactor(_))
        ));
    }

    #[test]
    fn test_salary_must_be_positive() {
        assert!(matches!(
            Salary::new(Decimal::ZERO, Currency::Eur),
            Err(DomainError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            Salary::new(Decimal::new(-5, 0), Currency::Eur),
            Err(DomainError::NegativeAmount(_))
        ));
        assert!(Salary::parse(Decimal::new(3500, 0), "gbp").is_ok());
    }

    #[test]
    fn test_standard_deductions() {
        let gross = GrossSalary::new(Decimal::new(300000, 2), Currency::Eur).unwrap();
        let deductions = Deductions::standard_for(&gross).unwrap();

        assert_eq!(deductions.taxes(), eur(60000));
        assert_eq!(deductions.social_security(), eur(22500));
        assert_eq!(deductions.health_insurance(), eur(15000));
        assert_eq!(deductions.total().unwrap(), eur(97500));

        let net = NetSalary::compute(&gross, &deductions).unwrap();
        assert_eq!(net.amount(), Decimal::new(202500, 2));
        assert_eq!(net.currency(), Currency::Eur);
    }

    #[test]
    fn test_net_rejects_excessive_deductions() {
        let gross = GrossSalary::new(Decimal::new(100, 0), Currency::Eur).unwrap();
        let deductions = Deductions::new(
            Decimal::new(80, 0),
            Decimal::new(20, 0),
            Decimal::new(1, 0),
            Currency::Eur,
        )
        .unwrap();

        assert!(matches!(
            NetSalary::compute(&gross, &deductions),
            Err(DomainError::DeductionsExceedGross { .. })
        ));
    }

    #[test]
    fn test_net_rejects_foreign_deductions() {
        let gross = GrossSalary::new(Decimal::new(100, 0), Currency::Eur).unwrap();
        let deductions = Deductions::none(Currency::Usd);
        assert!(matches!(
            NetSalary::compute(&gross, &deductions),
            Err(DomainError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_deductions_add() {
        let a = Deductions::new(Decimal::ONE, Decimal::ONE, Decimal::ONE, Currency::Eur).unwrap();
        let b = Deductions::new(Decimal::TWO, Decimal::ZERO, Decimal::ONE, Currency::Eur).unwrap();
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.total().unwrap().amount(), Decimal::new(6, 0));
        assert!(a.add(&Deductions::none(Currency::Gbp)).is_err());
    }

    #[test]
    fn test_amount_above_column_limit_is_rejected() {
        assert_eq!(MAX_AMOUNT.to_string(), "9999999999.99");
        assert!(Money::new(MAX_AMOUNT, Currency::Eur).is_ok());
        assert!(matches!(
            Money::new(Decimal::new(100_000_000_000, 0), Currency::Eur),
            Err(DomainError::AmountOutOfRange)
        ));
        assert!(matches!(
            Salary::new(Decimal::MAX, Currency::Usd),
            Err(DomainError::AmountOutOfRange)
        ));
        assert!(matches!(
            GrossSalary::new(Decimal::MAX, Currency::Eur),
            Err(DomainError::AmountOutOfRange)
        ));
    }

    #[test]
    fn test_arithmetic_past_limit_fails_without_panicking() {
        let top = Money::new(MAX_AMOUNT, Currency::Eur).unwrap();
        assert!(matches!(top.add(&eur(1)), Err(DomainError::AmountOutOfRange)));
        assert!(matches!(
            top.multiply(Decimal::MAX),
            Err(DomainError::AmountOutOfRange)
        ));
        assert!(matches!(
            top.percentage_of(Decimal::MAX),
            Err(DomainError::AmountOutOfRange)
        ));

        let gross = GrossSalary::new(MAX_AMOUNT, Currency::Eur).unwrap();
        assert!(matches!(
            gross.multiply(Decimal::TWO),
            Err(DomainError::AmountOutOfRange)
        ));
        let deductions = Deductions::standard_for(&gross).unwrap();
        assert!(NetSalary::compute(&gross, &deductions).is_ok());
    }

    #[test]
    fn test_deductions_total_past_limit_fails() {
        let deductions = Deductions::new(MAX_AMOUNT, MAX_AMOUNT, MAX_AMOUNT, Currency::Eur).unwrap();
        assert!(matches!(deductions.total(), Err(DomainError::AmountOutOfRange)));

        let gross = GrossSalary::new(Decimal::new(100, 0), Currency::Eur).unwrap();
        assert!(matches!(
            NetSalary::compute(&gross, &deductions),
            Err(DomainError::AmountOutOfRange)
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(eur(123456).to_string(), "1234.56 EUR");
    }

    fn currency_strategy() -> impl Strategy<Value = Currency> {
        prop_oneof![Just(Currency::Eur), Just(Currency::Usd), Just(Currency::Gbp)]
    }

    proptest! {
        #[test]
        fn prop_add_preserves_currency_and_sums(
            a in 0i64..1_000_000_000,
            b in 0i64..1_000_000_000,
            currency in currency_strategy(),
        ) {
            let x = Money::new(Decimal::new(a, 2), currency).unwrap();
            let y = Money::new(Decimal::new(b, 2), currency).unwrap();
            let sum = x.add(&y).unwrap();
            prop_assert_eq!(sum.currency(), currency);
            prop_assert_eq!(sum.amount(), Decimal::new(a + b, 2));
        }

        #[test]
        fn prop_subtract_is_inverse_of_add(
            a in 0i64..1_000_000_000,
            b in 0i64..1_000_000_000,
            currency in currency_strategy(),
        ) {
            let x = Money::new(Decimal::new(a, 2), currency).unwrap();
            let y = Money::new(Decimal::new(b, 2), currency).unwrap();
            let back = x.add(&y).unwrap().subtract(&y).unwrap();
            prop_assert_eq!(back, x);
        }

        #[test]
        fn prop_cross_currency_always_fails(
            a in 0i64..1_000_000,
            b in 0i64..1_000_000,
            left in currency_strategy(),
            right in currency_strategy(),
        ) {
            prop_assume!(left != right);
            let x = Money::new(Decimal::new(a, 2), left).unwrap();
            let y = Money::new(Decimal::new(b, 2), right).unwrap();
            prop_assert!(x.add(&y).is_err());
            prop_assert!(x.subtract(&y).is_err());
        }
    }
}
