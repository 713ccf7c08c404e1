use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use tracing::debug;

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::interest::{AccrualEngine, MonthlyAccrual};
use crate::payments::{
    validate_amount, CycleInput, Decision, DecisionTable, PaymentApplication, PaymentProcessable,
    Rule,
};
use crate::state::{LoanState, StateSnapshot};
use crate::types::{AccountNumber, LoanId, LoanStatus, PaymentOutcome};

/// installment loan serviced month by month
#[derive(Debug, Clone)]
pub struct InstallmentLoan {
    pub id: LoanId,
    pub annual_rate: Rate,
    pub state: LoanState,
    pub snapshots: Vec<StateSnapshot>,
}

/// everything one monthly tick will do to a loan, computed before any of it is applied
#[derive(Debug, Clone, PartialEq)]
pub struct CyclePlan {
    pub loan_id: LoanId,
    pub accrual: MonthlyAccrual,
    pub decision: Decision,
    /// balance after interest and any late fee
    pub closing_balance: Money,
    pub next_status: LoanStatus,
}

impl CyclePlan {
    pub fn interest(&self) -> Money {
        self.accrual.interest_amount
    }
}

impl InstallmentLoan {
    /// open a loan for an already validated principal
    pub fn originate(
        account: AccountNumber,
        loan_id: LoanId,
        principal: Money,
        table: &DecisionTable,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Self {
        let now = time_provider.now();
        let minimum = table.minimum_calculator().at_origination(principal);
        let state = LoanState::new(loan_id, account, principal, minimum.amount, now);

        events.emit(Event::LoanOpened {
            account,
            loan_id,
            principal,
            minimum_due: minimum.amount,
            timestamp: now,
        });

        let mut loan = Self {
            id: loan_id,
            annual_rate: table.minimum_calculator().annual_rate(),
            state,
            snapshots: Vec::new(),
        };
        loan.snapshot(now, "origination".to_string());
        loan
    }

    pub fn status(&self) -> LoanStatus {
        self.state.status
    }

    pub fn balance(&self) -> Money {
        self.state.balance
    }

    pub fn minimum_due(&self) -> Money {
        self.state.minimum_due
    }

    pub fn is_active(&self) -> bool {
        self.state.status.is_active()
    }

    /// work out the month-end result without touching the loan
    pub fn plan_cycle(&self, table: &DecisionTable, now: DateTime<Utc>) -> CyclePlan {
        let engine = AccrualEngine::new(self.annual_rate);
        let accrual = engine.accrue(self.state.balance, now);

        let decision = table.evaluate(CycleInput {
            was_delinquent: self.state.was_delinquent,
            payment_made: self.state.payment_this_cycle,
            minimum_due: self.state.minimum_due,
            opening_balance: self.state.opening_balance,
            balance_after_interest: accrual.balance_after,
        });

        let next_status = match decision.rule {
            Rule::PaidOff => LoanStatus::Closed,
            _ if decision.next_delinquent => LoanStatus::Delinquent,
            _ => LoanStatus::Open,
        };

        CyclePlan {
            loan_id: self.id,
            closing_balance: accrual.balance_after + decision.late_fee,
            accrual,
            decision,
            next_status,
        }
    }

    /// apply a month-end plan produced by `plan_cycle`
    pub fn commit_cycle(
        &mut self,
        plan: &CyclePlan,
        month: u32,
        now: DateTime<Utc>,
        events: &mut EventStore,
    ) {
        let account = self.state.account;
        let old_status = self.state.status;

        if plan.interest().is_positive() {
            self.state.total_interest += plan.interest();
            events.emit(Event::InterestAccrued {
                account,
                loan_id: self.id,
                amount: plan.interest(),
                month,
            });
        }
        self.state.last_interest_accrual = now;

        if plan.decision.late_fee.is_positive() {
            self.state.total_fees += plan.decision.late_fee;
            self.state.late_fee_count += 1;
            events.emit(Event::LateFeeApplied {
                account,
                loan_id: self.id,
                fee_amount: plan.decision.late_fee,
                month,
            });
        }

        self.state.balance = plan.closing_balance;
        self.state.opening_balance = plan.closing_balance;
        self.state.minimum_due = plan.decision.next_minimum_due();
        self.state.was_delinquent = plan.decision.next_delinquent;
        self.state.payment_this_cycle = Money::ZERO;

        if plan.next_status == LoanStatus::Closed {
            self.state.close(now);
            events.emit(Event::LoanClosed { account, loan_id: self.id, timestamp: now });
        } else {
            self.state.update_status(plan.next_status, now);
            events.emit(Event::MinimumPaymentSet {
                account,
                loan_id: self.id,
                amount: self.state.minimum_due,
                month,
            });
        }

        if old_status != self.state.status {
            events.emit(Event::StatusChanged {
                account,
                loan_id: self.id,
                old_status,
                new_status: self.state.status,
                month,
            });
        }

        debug!(
            account,
            loan_id = self.id,
            rule = ?plan.decision.rule,
            balance = %self.state.balance,
            minimum_due = %self.state.minimum_due,
            status = %self.state.status,
            "loan cycle closed"
        );

        self.snapshot(now, format!("month-end {}", month));
    }

    fn snapshot(&mut self, timestamp: DateTime<Utc>, trigger: String) {
        self.snapshots.push(StateSnapshot::capture(&self.state, timestamp, trigger));
    }
}

impl PaymentProcessable for InstallmentLoan {
    fn apply_payment(
        &mut self,
        amount: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<PaymentOutcome> {
        validate_amount(amount)?;

        if !self.state.can_accept_payment() {
            debug!(loan_id = self.id, %amount, "payment to closed loan ignored");
            return Ok(PaymentOutcome::Ignored);
        }

        let now = time_provider.now();
        let account = self.state.account;
        let application = PaymentApplication::against(self.state.balance, amount);

        self.state.record_payment(application.applied);
        events.emit(Event::PaymentReceived {
            account,
            loan_id: self.id,
            amount: application.applied,
            remaining_balance: self.state.balance,
            timestamp: now,
        });

        if application.pays_off() {
            self.state.close(now);
            events.emit(Event::LoanClosed { account, loan_id: self.id, timestamp: now });
            self.snapshot(now, format!("payoff: {}", application.applied));
            return Ok(PaymentOutcome::PaidOff { applied: application.applied });
        }

        self.snapshot(now, format!("payment: {}", application.applied));
        Ok(PaymentOutcome::Applied {
            applied: application.applied,
            remaining_balance: self.state.balance,
        })
    }
}
