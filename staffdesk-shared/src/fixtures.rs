/// Deterministic demo data
///
/// [`generate`] builds employees, payroll history, vacation requests and two
/// login accounts from a seeded `StdRng`, so the same seed always yields the
/// same people, amounts and dates (ids are still random v4 UUIDs). Every
/// object goes through the domain factories, so the output satisfies the
/// same invariants as data entered through the API:
///
/// - payrolls cover at most the last `payroll_months` full calendar months
///   and never a month that ended before the hire date
/// - vacations of one employee never overlap and start only after the
///   eligibility window
/// - statuses only follow legal transitions
///
/// # Example
///
/// ```
/// use staffdesk_shared::fixtures::{generate, FixtureConfig};
///
/// # fn example() -> Result<(), staffdesk_shared::fixtures::FixtureError> {
/// let set = generate(&FixtureConfig { employees: 5, ..FixtureConfig::fast() })?;
/// assert_eq!(set.employees.len(), 5);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Months, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::auth::password::{hash_password_with, HashParams, PasswordError};
use crate::domain::employee::Employee;
use crate::domain::identity::{Email, FullName, Position};
use crate::domain::money::{Currency, Salary};
use crate::domain::payroll::Payroll;
use crate::domain::period::{PayrollPeriod, VacationPeriod};
use crate::domain::user::{Role, User};
use crate::domain::vacation::Vacation;
use crate::domain::DomainError;

/// Login of the seeded administrator
pub const ADMIN_EMAIL: &str = "admin@staffdesk.test";
pub const ADMIN_PASSWORD: &str = "Admin!2345";

/// Login of the seeded regular user
pub const USER_EMAIL: &str = "user@staffdesk.test";
pub const USER_PASSWORD: &str = "User!23456";

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bruno", "Chloe", "Daniel", "Elena", "Farid", "Grace", "Hugo", "Ines", "Jonas",
    "Keiko", "Liam", "Marta", "Nils", "Olivia", "Pablo", "Quinn", "Rosa", "Samir", "Tessa",
];

const LAST_NAMES: &[&str] = &[
    "Anders", "Berger", "Costa", "Dubois", "Eriksen", "Fischer", "Garcia", "Hansen", "Ivanova",
    "Jensen", "Kowalski", "Lopez", "Moreau", "Novak", "Olsen", "Petit", "Rossi", "Schmidt",
];

const POSITIONS: &[&str] = &[
    "Software Engineer",
    "Senior Software Engineer",
    "Product Manager",
    "Designer",
    "HR Specialist",
    "Accountant",
    "Sales Representative",
    "Support Engineer",
    "Data Analyst",
    "Office Manager",
];

const VACATION_REASONS: &[&str] = &[
    "Family holiday",
    "Summer trip",
    "Wedding",
    "Moving house",
    "Personal time off",
    "Winter break",
];

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),
}

#[derive(Debug, Clone)]
pub struct FixtureConfig {
    pub employees: usize,
    pub seed: u64,
    /// Reference date; payroll months and vacation statuses are relative to it
    pub today: NaiveDate,
    pub payroll_months: u32,
    pub max_vacations_per_employee: usize,
    pub hash_params: HashParams,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            employees: 25,
            seed: 42,
            today: Utc::now().date_naive(),
            payroll_months: 6,
            max_vacations_per_employee: 3,
            hash_params: HashParams::default(),
        }
    }
}

impl FixtureConfig {
    /// Default sizes with cheap password hashing
    pub fn fast() -> Self {
        Self {
            hash_params: HashParams::fast(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    pub employees: Vec<Employee>,
    pub payrolls: Vec<Payroll>,
    pub vacations: Vec<Vacation>,
    pub users: Vec<User>,
}

pub fn generate(config: &FixtureConfig) -> Result<FixtureSet, FixtureError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut set = FixtureSet::default();

    for index in 0..config.employees {
        let employee = random_employee(&mut rng, index, config.today)?;

        set.payrolls
            .extend(payroll_history(&mut rng, &employee, config)?);
        set.vacations
            .extend(vacation_history(&mut rng, &employee, config)?);
        set.employees.push(employee);
    }

    set.users = vec![
        User::register(
            Email::new(ADMIN_EMAIL)?,
            hash_password_with(ADMIN_PASSWORD, config.hash_params)?,
            vec![Role::Admin],
        ),
        User::register(
            Email::new(USER_EMAIL)?,
            hash_password_with(USER_PASSWORD, config.hash_params)?,
            vec![Role::User],
        ),
    ];

    tracing::debug!(
        employees = set.employees.len(),
        payrolls = set.payrolls.len(),
        vacations = set.vacations.len(),
        "Generated fixtures"
    );

    Ok(set)
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn random_employee(rng: &mut StdRng, index: usize, today: NaiveDate) -> Result<Employee, DomainError> {
    let first = pick(rng, FIRST_NAMES);
    let last = pick(rng, LAST_NAMES);
    // The index keeps emails unique when names repeat
    let email = format!("{}.{}{}@staffdesk.test", first, last, index + 1).to_lowercase();

    let currency = match rng.gen_range(0..10) {
        0 => Currency::Usd,
        1 => Currency::Gbp,
        _ => Currency::Eur,
    };
    // 2500.00 to 9000.00 in steps of 50
    let salary = Decimal::new(rng.gen_range(50..=180) * 5000, 2);
    let hired_at = today - Duration::days(rng.gen_range(30..=2500));

    Ok(Employee::hire(
        FullName::new(first, last)?,
        Email::new(&email)?,
        Position::new(pick(rng, POSITIONS))?,
        Salary::new(salary, currency)?,
        hired_at,
    ))
}

fn payroll_history(
    rng: &mut StdRng,
    employee: &Employee,
    config: &FixtureConfig,
) -> Result<Vec<Payroll>, DomainError> {
    let mut payrolls = Vec::new();

    for months_back in (1..=config.payroll_months).rev() {
        let Some(day) = config.today.checked_sub_months(Months::new(months_back)) else {
            continue;
        };
        let period = PayrollPeriod::month_of(day)?;
        if period.end() < employee.hired_at() {
            continue;
        }

        let mut payroll = Payroll::for_employee(employee, period)?;
        let roll = rng.gen_range(0..100);
        if months_back > 1 {
            // Older months are settled
            if roll < 5 {
                payroll.cancel()?;
            } else {
                payroll.process()?;
                payroll.pay()?;
            }
        } else if roll < 40 {
            payroll.process()?;
        } else if roll < 45 {
            payroll.process()?;
            payroll.cancel()?;
        }
        payrolls.push(payroll);
    }

    Ok(payrolls)
}

fn vacation_history(
    rng: &mut StdRng,
    employee: &Employee,
    config: &FixtureConfig,
) -> Result<Vec<Vacation>, DomainError> {
    let mut vacations = Vec::new();
    if !employee.is_eligible_for_vacation(config.today) {
        return Ok(vacations);
    }

    let window_start = config.today - Duration::days(365);
    let mut cursor = employee.vacation_eligible_from().max(window_start);
    let count = rng.gen_range(0..=config.max_vacations_per_employee);

    for _ in 0..count {
        let start = cursor + Duration::days(rng.gen_range(0..90));
        let end = start + Duration::days(rng.gen_range(0..10));
        let period = VacationPeriod::new(start, end)?;

        let mut vacation = Vacation::request(employee, period, pick(rng, VACATION_REASONS), config.today)?;
        if start <= config.today {
            if rng.gen_bool(0.8) {
                vacation.approve()?;
            } else {
                vacation.reject(Some("Overlaps with a busy period"))?;
            }
        } else if rng.gen_bool(0.3) {
            vacation.approve()?;
        }
        vacations.push(vacation);

        // Next request starts strictly after this one ends
        cursor = end + Duration::days(1);
    }

    Ok(vacations)
}
