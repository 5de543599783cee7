//! Arithmetic for the calculator mini project.

use std::fmt;
use std::str::FromStr;

use super::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    /// Apply the operator. Division by zero yields 0 rather than infinity.
    pub fn apply(self, first: f64, second: f64) -> f64 {
        match self {
            Operator::Add => first + second,
            Operator::Subtract => first - second,
            Operator::Multiply => first * second,
            Operator::Divide => {
                if second == 0.0 {
                    0.0
                } else {
                    first / second
                }
            }
        }
    }
}

impl FromStr for Operator {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(Operator::Add),
            "-" | "−" => Ok(Operator::Subtract),
            "*" | "×" | "x" => Ok(Operator::Multiply),
            "/" | "÷" => Ok(Operator::Divide),
            other => Err(StoreError::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Render an evaluated expression for the history list, e.g. "12 * 3"
pub fn format_expression(first: f64, operator: Operator, second: f64) -> String {
    format!("{} {} {}", first, operator, second)
}
