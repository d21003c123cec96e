//! Inclusive range filters and aggregate results over employees.

use chrono::NaiveDate;

use super::{Employee, EmployeeValidationError};

/// Inclusive salary bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryRange {
    min: f64,
    max: f64,
}

impl SalaryRange {
    /// Build a range; both bounds must be finite and `min <= max`.
    pub fn new(min: f64, max: f64) -> Result<Self, EmployeeValidationError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(EmployeeValidationError::NonFiniteSalaryBound);
        }
        if min > max {
            return Err(EmployeeValidationError::InvertedSalaryRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound, inclusive.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound, inclusive.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Whether `salary` falls within the bounds.
    #[must_use]
    pub fn contains(&self, salary: f64) -> bool {
        self.min <= salary && salary <= self.max
    }
}

/// Inclusive hire date bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HireDateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl HireDateRange {
    /// Build a range; `from` must not be after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, EmployeeValidationError> {
        if from > to {
            return Err(EmployeeValidationError::InvertedDateRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// First hire date included.
    #[must_use]
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    /// Last hire date included.
    #[must_use]
    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Whether `date` falls within the bounds.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Lowest and highest paid employees.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryExtremes {
    pub min: Employee,
    pub max: Employee,
}

impl SalaryExtremes {
    /// Scan `employees` for the salary extremes. Returns `None` when empty.
    ///
    /// Ties keep the first employee encountered.
    pub fn from_employees<'a, I>(employees: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Employee>,
    {
        let mut iter = employees.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), candidate| {
            let salary = candidate.salary().value();
            let next_min = if salary < min.salary().value() {
                candidate
            } else {
                min
            };
            let next_max = if salary > max.salary().value() {
                candidate
            } else {
                max
            };
            (next_min, next_max)
        });
        Some(Self {
            min: min.clone(),
            max: max.clone(),
        })
    }
}
