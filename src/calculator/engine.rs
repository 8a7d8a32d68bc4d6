//! Calculator arithmetic state machine
//!
//! Left-to-right evaluation with no operator precedence, matching a
//! four-function pocket calculator. Division by zero displays `0` rather
//! than an error.

use super::keys::{Key, Operator};

pub struct CalculatorEngine {
    display: String,
    pending_operand: Option<f64>,
    pending_op: Option<Operator>,
    awaiting_operand: bool,
}

impl CalculatorEngine {
    pub fn new() -> Self {
        Self {
            display: "0".to_string(),
            pending_operand: None,
            pending_op: None,
            awaiting_operand: false,
        }
    }

    /// Current display string.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Apply one keypad key.
    pub fn press(&mut self, key: Key) {
        match key {
            Key::Digit(d) => self.input_digit(d),
            Key::Decimal => self.input_decimal(),
            Key::Op(op) => self.input_operator(op),
            Key::Equals => self.finalize(),
            Key::Negate => self.set_display_value(-self.display_value()),
            Key::Percent => self.set_display_value(self.display_value() / 100.0),
            Key::Clear => self.clear(),
        }
    }

    /// Reset to the initial state (display `0`, nothing pending).
    pub fn clear(&mut self) {
        self.display = "0".to_string();
        self.pending_operand = None;
        self.pending_op = None;
        self.awaiting_operand = false;
    }

    fn input_digit(&mut self, digit: u8) {
        if self.awaiting_operand {
            self.display = digit.to_string();
            self.awaiting_operand = false;
        } else if self.display == "0" {
            self.display = digit.to_string();
        } else {
            self.display.push((b'0' + digit) as char);
        }
    }

    fn input_decimal(&mut self) {
        if self.awaiting_operand {
            self.display = "0.".to_string();
            self.awaiting_operand = false;
        } else if !self.display.contains('.') {
            self.display.push('.');
        }
    }

    fn input_operator(&mut self, op: Operator) {
        let input = self.display_value();

        match (self.pending_operand, self.pending_op) {
            (Some(prev), Some(pending)) if !self.awaiting_operand => {
                let result = Self::compute(prev, input, pending);
                self.set_display_value(result);
                self.pending_operand = Some(result);
            }
            (None, _) => {
                self.pending_operand = Some(input);
            }
            _ => {} // consecutive operators: keep the operand, replace the op
        }

        self.pending_op = Some(op);
        self.awaiting_operand = true;
    }

    fn finalize(&mut self) {
        if let (Some(prev), Some(op)) = (self.pending_operand, self.pending_op) {
            if !self.awaiting_operand {
                let result = Self::compute(prev, self.display_value(), op);
                self.set_display_value(result);
            }
            self.pending_operand = None;
            self.pending_op = None;
            self.awaiting_operand = true;
        }
    }

    fn compute(lhs: f64, rhs: f64, op: Operator) -> f64 {
        match op {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
            Operator::Multiply => lhs * rhs,
            Operator::Divide => {
                if rhs == 0.0 {
                    0.0
                } else {
                    lhs / rhs
                }
            }
        }
    }

    fn display_value(&self) -> f64 {
        self.display.parse().unwrap_or(0.0)
    }

    fn set_display_value(&mut self, value: f64) {
        self.display = if value == value.trunc() && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            format!("{value}")
        };
    }
}

impl Default for CalculatorEngine {
    fn default() -> Self {
        Self::new()
    }
}
