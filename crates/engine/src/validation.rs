//! Shape validation, one function per operation.
//!
//! The functions are public so a client can run the exact checks the engine
//! runs before it commits. Each one collects every violation it finds and
//! returns them together in a single [`EngineError::Validation`]. Balance
//! sufficiency is not checked here because it needs stored state.

use chrono::NaiveDate;

use crate::{
    CategoryTxCmd, EngineError, GoalTxCmd, GoalUpdate, MoneyCents, NewCategory, NewGoalCmd,
    NewIncome, ProfileUpdate, ResultEngine, SetupBudgetCmd, TransferCmd, util::text_len,
};

pub const MIN_INCOME_DESCRIPTION_LEN: usize = 3;
pub const MIN_CATEGORY_NAME_LEN: usize = 2;
pub const MIN_TRANSFER_DESCRIPTION_LEN: usize = 3;
pub const MIN_GOAL_NAME_LEN: usize = 3;
pub const MIN_PROFILE_NAME_LEN: usize = 2;

fn finish(violations: Vec<String>) -> ResultEngine<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(EngineError::Validation(violations))
    }
}

fn income_violations(prefix: &str, income: &NewIncome, out: &mut Vec<String>) {
    if text_len(&income.description) < MIN_INCOME_DESCRIPTION_LEN {
        out.push(format!(
            "{prefix}description must have at least {MIN_INCOME_DESCRIPTION_LEN} characters"
        ));
    }
    if !income.amount.is_positive() {
        out.push(format!("{prefix}amount must be > 0"));
    }
    if !(1..=31).contains(&income.receive_day) {
        out.push(format!("{prefix}receive_day must be between 1 and 31"));
    }
}

fn category_name_violations(prefix: &str, name: &str, out: &mut Vec<String>) {
    if text_len(name) < MIN_CATEGORY_NAME_LEN {
        out.push(format!(
            "{prefix}name must have at least {MIN_CATEGORY_NAME_LEN} characters"
        ));
    }
}

/// Validate a single income source.
pub fn validate_income(income: &NewIncome) -> ResultEngine<()> {
    let mut violations = Vec::new();
    income_violations("", income, &mut violations);
    finish(violations)
}

/// Validate a budget setup request.
///
/// Allocations are checked strictly: the categories may not allocate more
/// than the incomes provide.
pub fn validate_setup(cmd: &SetupBudgetCmd) -> ResultEngine<()> {
    let mut violations = Vec::new();

    if cmd.incomes.is_empty() {
        violations.push("at least one income is required".to_string());
    }
    if cmd.categories.is_empty() {
        violations.push("at least one category is required".to_string());
    }
    if let Some(name) = cmd.name.as_deref()
        && text_len(name) == 0
    {
        violations.push("budget name must not be empty".to_string());
    }

    for (index, income) in cmd.incomes.iter().enumerate() {
        income_violations(&format!("incomes[{index}]: "), income, &mut violations);
    }
    for (index, category) in cmd.categories.iter().enumerate() {
        let prefix = format!("categories[{index}]: ");
        category_name_violations(&prefix, &category.name, &mut violations);
        if category.allocated_amount.is_negative() {
            violations.push(format!("{prefix}allocated_amount must be >= 0"));
        }
    }

    let total_income = cmd
        .incomes
        .iter()
        .filter(|income| income.amount.is_positive())
        .map(|income| income.amount)
        .try_fold(MoneyCents::ZERO, MoneyCents::checked_add);
    let allocated = cmd
        .categories
        .iter()
        .filter(|category| !category.allocated_amount.is_negative())
        .map(|category| category.allocated_amount)
        .try_fold(MoneyCents::ZERO, MoneyCents::checked_add);
    match (total_income, allocated) {
        (Some(total_income), Some(allocated)) if allocated > total_income => {
            violations.push(format!(
                "allocated amount {allocated} exceeds total income {total_income}"
            ));
        }
        (None, _) | (_, None) => violations.push("amounts too large".to_string()),
        _ => {}
    }

    finish(violations)
}

/// Validate a category added after setup.
pub fn validate_new_category(category: &NewCategory) -> ResultEngine<()> {
    let mut violations = Vec::new();
    category_name_violations("", &category.name, &mut violations);
    if !category.allocated_amount.is_positive() {
        violations.push("allocated_amount must be > 0".to_string());
    }
    finish(violations)
}

/// Validate a transfer between categories.
pub fn validate_transfer(cmd: &TransferCmd) -> ResultEngine<()> {
    let mut violations = Vec::new();
    if cmd.from_category_id == cmd.to_category_id {
        violations.push("from_category_id and to_category_id must differ".to_string());
    }
    if !cmd.amount.is_positive() {
        violations.push("amount must be > 0".to_string());
    }
    if text_len(&cmd.description) < MIN_TRANSFER_DESCRIPTION_LEN {
        violations.push(format!(
            "description must have at least {MIN_TRANSFER_DESCRIPTION_LEN} characters"
        ));
    }
    finish(violations)
}

/// Validate an expense or income transaction against a category.
pub fn validate_expense(cmd: &CategoryTxCmd) -> ResultEngine<()> {
    let mut violations = Vec::new();
    if !cmd.amount.is_positive() {
        violations.push("amount must be > 0".to_string());
    }
    if text_len(&cmd.description) == 0 {
        violations.push("description must not be empty".to_string());
    }
    finish(violations)
}

fn goal_name_violations(name: &str, out: &mut Vec<String>) {
    if text_len(name) < MIN_GOAL_NAME_LEN {
        out.push(format!(
            "name must have at least {MIN_GOAL_NAME_LEN} characters"
        ));
    }
}

/// Validate a goal creation request.
pub fn validate_new_goal(cmd: &NewGoalCmd) -> ResultEngine<()> {
    let mut violations = Vec::new();
    goal_name_violations(&cmd.name, &mut violations);
    if !cmd.target_amount.is_positive() {
        violations.push("target_amount must be > 0".to_string());
    }
    if cmd.monthly_target.is_some_and(MoneyCents::is_negative) {
        violations.push("monthly_target must be >= 0".to_string());
    }
    finish(violations)
}

/// Validate a partial goal update.
pub fn validate_goal_update(update: &GoalUpdate) -> ResultEngine<()> {
    let mut violations = Vec::new();
    if update.is_empty() {
        violations.push("provide at least one field to update".to_string());
    }
    if let Some(name) = update.name.as_deref() {
        goal_name_violations(name, &mut violations);
    }
    if update.target_amount.is_some_and(|t| !t.is_positive()) {
        violations.push("target_amount must be > 0".to_string());
    }
    if update.monthly_target.is_some_and(MoneyCents::is_negative) {
        violations.push("monthly_target must be >= 0".to_string());
    }
    if update.clear_monthly_target && update.monthly_target.is_some() {
        violations.push("monthly_target cannot be set and cleared at once".to_string());
    }
    if update.clear_target_date && update.target_date.is_some() {
        violations.push("target_date cannot be set and cleared at once".to_string());
    }
    finish(violations)
}

/// Validate a goal deposit or withdrawal.
pub fn validate_goal_transaction(cmd: &GoalTxCmd) -> ResultEngine<()> {
    if !cmd.amount.is_positive() {
        return Err(EngineError::invalid("amount must be > 0"));
    }
    Ok(())
}

/// Validate a profile update. `today` bounds the date of birth.
pub fn validate_profile_update(update: &ProfileUpdate, today: NaiveDate) -> ResultEngine<()> {
    let mut violations = Vec::new();
    if let Some(name) = update.name.as_deref()
        && text_len(name) < MIN_PROFILE_NAME_LEN
    {
        violations.push(format!(
            "name must have at least {MIN_PROFILE_NAME_LEN} characters"
        ));
    }
    if let Some(email) = update.email.as_deref() {
        let valid = email
            .trim()
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            });
        if !valid {
            violations.push("email is not valid".to_string());
        }
    }
    if update.date_of_birth.is_some_and(|dob| dob > today) {
        violations.push("date_of_birth must not be in the future".to_string());
    }
    finish(violations)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn cents(value: i64) -> MoneyCents {
        MoneyCents::new(value)
    }

    #[test]
    fn setup_collects_every_violation() {
        let cmd = SetupBudgetCmd::new(Uuid::new_v4())
            .income("ab", cents(0), 32)
            .category("x", cents(-1), "#fff");

        let Err(EngineError::Validation(violations)) = validate_setup(&cmd) else {
            panic!("expected validation error");
        };
        assert_eq!(
            violations,
            vec![
                "incomes[0]: description must have at least 3 characters".to_string(),
                "incomes[0]: amount must be > 0".to_string(),
                "incomes[0]: receive_day must be between 1 and 31".to_string(),
                "categories[0]: name must have at least 2 characters".to_string(),
                "categories[0]: allocated_amount must be >= 0".to_string(),
            ]
        );
    }

    #[test]
    fn setup_requires_incomes_and_categories() {
        let cmd = SetupBudgetCmd::new(Uuid::new_v4());
        let Err(EngineError::Validation(violations)) = validate_setup(&cmd) else {
            panic!("expected validation error");
        };
        assert!(violations.contains(&"at least one income is required".to_string()));
        assert!(violations.contains(&"at least one category is required".to_string()));
    }

    #[test]
    fn setup_rejects_over_allocation() {
        let cmd = SetupBudgetCmd::new(Uuid::new_v4())
            .income("Salary", cents(3000_00), 5)
            .category("Rent", cents(2000_00), "#EF4444")
            .category("Food", cents(1200_00), "#3B82F6");
        assert_eq!(
            validate_setup(&cmd),
            Err(EngineError::Validation(vec![
                "allocated amount 3200.00 exceeds total income 3000.00".to_string()
            ]))
        );
    }

    #[test]
    fn setup_accepts_zero_allocation_category() {
        let cmd = SetupBudgetCmd::new(Uuid::new_v4())
            .income("Salary", cents(3000_00), 5)
            .category("Misc", cents(0), "#EF4444");
        assert_eq!(validate_setup(&cmd), Ok(()));
    }

    #[test]
    fn transfer_to_same_category_is_rejected() {
        let id = Uuid::new_v4();
        let cmd = TransferCmd {
            user_id: Uuid::new_v4(),
            from_category_id: id,
            to_category_id: id,
            amount: cents(10_00),
            description: "ok".to_string(),
        };
        let Err(EngineError::Validation(violations)) = validate_transfer(&cmd) else {
            panic!("expected validation error");
        };
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn goal_rules() {
        let user = Uuid::new_v4();
        assert!(validate_new_goal(&NewGoalCmd::new(user, "Car", cents(1))).is_ok());
        assert!(validate_new_goal(&NewGoalCmd::new(user, "TV", cents(1))).is_err());
        assert!(validate_new_goal(&NewGoalCmd::new(user, "Trip", cents(0))).is_err());
        assert!(
            validate_new_goal(&NewGoalCmd::new(user, "Trip", cents(1)).monthly_target(cents(-1)))
                .is_err()
        );
        assert!(validate_goal_update(&GoalUpdate::default()).is_err());

        let clear_only = GoalUpdate {
            clear_monthly_target: true,
            ..Default::default()
        };
        assert!(validate_goal_update(&clear_only).is_ok());
        let set_and_clear = GoalUpdate {
            monthly_target: Some(cents(10)),
            clear_monthly_target: true,
            ..Default::default()
        };
        assert!(validate_goal_update(&set_and_clear).is_err());
    }

    #[test]
    fn profile_rules() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let update = ProfileUpdate {
            name: Some("A".to_string()),
            email: Some("not-an-email".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(2027, 1, 1),
        };
        let Err(EngineError::Validation(violations)) = validate_profile_update(&update, today)
        else {
            panic!("expected validation error");
        };
        assert_eq!(violations.len(), 3);

        let update = ProfileUpdate {
            name: Some("Ana".to_string()),
            email: Some("ana@example.com".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1),
        };
        assert!(validate_profile_update(&update, today).is_ok());
    }
}
