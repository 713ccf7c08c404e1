use chrono::{DateTime, Months, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::bank::Customer;
use crate::decimal::Money;
use crate::facilities::CyclePlan;
use crate::payments::{DecisionTable, Rule};
use crate::types::{AccountNumber, LoanId, LoanStatus};

/// rule a single loan landed on during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanCycleSummary {
    pub account: AccountNumber,
    pub loan_id: LoanId,
    pub rule: Rule,
    pub interest: Money,
    pub late_fee: Money,
    pub balance: Money,
    pub minimum_due: Money,
    pub status: LoanStatus,
}

/// totals for one month-end run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthEndReport {
    pub report_id: Uuid,
    pub month: u32,
    pub processed_at: DateTime<Utc>,
    pub customers_processed: usize,
    pub loans_serviced: usize,
    pub loans_closed: usize,
    pub late_fees_charged: usize,
    pub total_late_fees: Money,
    pub total_loan_interest: Money,
    pub total_savings_interest: Money,
    pub loans: Vec<LoanCycleSummary>,
}

impl MonthEndReport {
    fn new(month: u32, processed_at: DateTime<Utc>) -> Self {
        Self {
            report_id: Uuid::new_v4(),
            month,
            processed_at,
            customers_processed: 0,
            loans_serviced: 0,
            loans_closed: 0,
            late_fees_charged: 0,
            total_late_fees: Money::ZERO,
            total_loan_interest: Money::ZERO,
            total_savings_interest: Money::ZERO,
            loans: Vec::new(),
        }
    }

    /// pretty-printed json
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// runs the month-end tick over every customer
#[derive(Debug, Clone)]
pub struct MonthlyProcessor {
    table: DecisionTable,
}

impl MonthlyProcessor {
    pub fn new(table: DecisionTable) -> Self {
        Self { table }
    }

    /// move the simulation clock forward one calendar month
    pub fn advance_clock(&self, time_provider: &SafeTimeProvider) -> DateTime<Utc> {
        let now = time_provider.now();
        match (time_provider.test_control(), now.checked_add_months(Months::new(1))) {
            (Some(control), Some(next)) => {
                control.advance(next - now);
            }
            _ => warn!("simulation clock not controllable, month advanced without moving time"),
        }
        time_provider.now()
    }

    /// run one tick; customers are visited in the iterator's order
    pub fn process<'a>(
        &self,
        customers: impl IntoIterator<Item = &'a mut Customer>,
        month: u32,
        now: DateTime<Utc>,
    ) -> MonthEndReport {
        let span = info_span!("month_end", month);
        let _guard = span.enter();

        let mut report = MonthEndReport::new(month, now);

        for customer in customers {
            self.process_customer(customer, month, now, &mut report);
            report.customers_processed += 1;
        }

        info!(
            customers = report.customers_processed,
            loans = report.loans_serviced,
            closed = report.loans_closed,
            late_fees = report.late_fees_charged,
            loan_interest = %report.total_loan_interest,
            savings_interest = %report.total_savings_interest,
            "month-end processing complete"
        );

        report
    }

    /// plan every account of one customer, then commit them together
    fn process_customer(
        &self,
        customer: &mut Customer,
        month: u32,
        now: DateTime<Utc>,
        report: &mut MonthEndReport,
    ) {
        let plans: Vec<CyclePlan> = customer
            .loans
            .iter()
            .filter(|loan| loan.is_active())
            .map(|loan| loan.plan_cycle(&self.table, now))
            .collect();
        let savings_accrual = customer.savings.plan_interest(now);

        for plan in &plans {
            let Some(loan) = customer.loans.iter_mut().find(|loan| loan.id == plan.loan_id) else {
                continue;
            };
            loan.commit_cycle(plan, month, now, &mut customer.events);

            report.loans_serviced += 1;
            report.total_loan_interest += plan.interest();
            if plan.decision.late_fee.is_positive() {
                report.late_fees_charged += 1;
                report.total_late_fees += plan.decision.late_fee;
            }
            if loan.status() == LoanStatus::Closed {
                report.loans_closed += 1;
            }
            report.loans.push(LoanCycleSummary {
                account: customer.account,
                loan_id: loan.id,
                rule: plan.decision.rule,
                interest: plan.interest(),
                late_fee: plan.decision.late_fee,
                balance: loan.balance(),
                minimum_due: loan.minimum_due(),
                status: loan.status(),
            });
        }

        customer.savings.credit_interest(&savings_accrual, month, &mut customer.events);
        report.total_savings_interest += savings_accrual.interest_amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BankConfig;
    use crate::events::EventStore;
    use crate::facilities::{InstallmentLoan, SavingsAccount};
    use crate::payments::PaymentProcessable;
    use chrono::{Datelike, TimeZone};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn customer(account: AccountNumber, config: &BankConfig, time: &SafeTimeProvider) -> Customer {
        Customer {
            account,
            name: format!("customer-{}", account),
            savings: SavingsAccount::open(account, config.savings_rate(), time.now()),
            loans: Vec::new(),
            events: EventStore::new(),
        }
    }

    #[test]
    fn test_clock_moves_one_calendar_month() {
        let config = BankConfig::standard(dec!(12)).unwrap();
        let processor = MonthlyProcessor::new(DecisionTable::from_config(&config));
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap()
        ));

        let next = processor.advance_clock(&time);
        assert_eq!(next.month(), 2);
        assert_eq!(next.day(), 29);

        let next = processor.advance_clock(&time);
        assert_eq!(next.month(), 3);
    }

    #[test]
    fn test_tick_services_loans_and_savings() {
        let config = BankConfig::standard(dec!(12)).unwrap();
        let table = DecisionTable::from_config(&config);
        let processor = MonthlyProcessor::new(table.clone());
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        ));

        let mut alice = customer(1000, &config, &time);
        alice.savings.deposit(Money::from_major(1_500), &time, &mut alice.events).unwrap();

        let mut dan = customer(1001, &config, &time);
        let loan = InstallmentLoan::originate(1001, 1, Money::from_major(10_000), &table, &time, &mut dan.events);
        dan.loans.push(loan);

        let now = processor.advance_clock(&time);
        let report = processor.process(vec![&mut alice, &mut dan], 2, now);

        assert_eq!(report.customers_processed, 2);
        assert_eq!(report.loans_serviced, 1);
        assert_eq!(report.late_fees_charged, 0);
        assert_eq!(report.total_loan_interest, Money::from_major(100));
        assert_eq!(report.total_savings_interest, Money::from_decimal(dec!(3.75)));
        assert_eq!(report.loans[0].rule, Rule::FirstSlip);

        assert_eq!(alice.savings.balance(), Money::from_decimal(dec!(1503.75)));
        assert_eq!(dan.loans[0].balance(), Money::from_major(10_100));
        assert_eq!(dan.loans[0].minimum_due(), Money::from_major(201));
        assert_eq!(dan.loans[0].status(), LoanStatus::Delinquent);
    }

    #[test]
    fn test_closed_loans_skipped() {
        let config = BankConfig::standard(dec!(10)).unwrap();
        let table = DecisionTable::from_config(&config);
        let processor = MonthlyProcessor::new(table.clone());
        let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));

        let mut dan = customer(1000, &config, &time);
        let mut loan = InstallmentLoan::originate(1000, 1, Money::from_major(500), &table, &time, &mut dan.events);
        loan.apply_payment(Money::from_major(500), &time, &mut dan.events).unwrap();
        dan.loans.push(loan);

        let before = dan.loans[0].state.clone();
        let now = processor.advance_clock(&time);
        let report = processor.process(vec![&mut dan], 2, now);

        assert_eq!(report.loans_serviced, 0);
        assert_eq!(dan.loans[0].state, before);
    }

    #[test]
    fn test_report_counts_fees() {
        let config = BankConfig::standard(dec!(10)).unwrap();
        let table = DecisionTable::from_config(&config);
        let processor = MonthlyProcessor::new(table.clone());
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        ));

        let mut dan = customer(1000, &config, &time);
        let loan = InstallmentLoan::originate(1000, 1, Money::from_major(1_000), &table, &time, &mut dan.events);
        dan.loans.push(loan);

        let mut last = None;
        for month in 2..=3 {
            let now = processor.advance_clock(&time);
            last = Some(processor.process(vec![&mut dan], month, now));
        }

        let report = last.unwrap();
        assert_eq!(report.late_fees_charged, 1);
        assert_eq!(report.total_late_fees, Money::from_major(50));
        assert_eq!(report.loans[0].rule, Rule::RepeatDelinquency);
        assert!(report.to_json_pretty().unwrap().contains("RepeatDelinquency"));
    }
}
