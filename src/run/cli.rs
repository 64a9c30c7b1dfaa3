use anyhow::{Context, Result};
use serde::Serialize;

use crate::analytics;
use crate::config::Config;
use crate::models::{parse_amount, Budget, Expense, DEFAULT_CATEGORY};
use crate::persistence;

pub(crate) fn as_cli(args: &[String], config: &Config) -> Result<()> {
    let Some(command) = args.get(1) else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "add" | "a" => cli_add(&args[2..], config),
        "list" | "ls" => cli_list(config),
        "summary" | "s" => cli_summary(config),
        "budget" | "b" => cli_budget(&args[2..], config),
        "export" => cli_export(&args[2..], config),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("budget {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Budget Tracker — local expense log with category budgets");
    println!();
    println!("Usage: budget <command>");
    println!();
    println!("Commands:");
    println!("  add <amount> [category] [description...]  Record an expense");
    println!("  list                          List recorded expenses");
    println!("  summary                       Totals and averages by category");
    println!("  budget set <category> <limit> Create or replace a budget");
    println!("  budget show                   Show budgets and what remains");
    println!("  export [path]                 Export expenses to CSV");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn cli_add(args: &[String], config: &Config) -> Result<()> {
    if args.is_empty() {
        anyhow::bail!("Usage: budget add <amount> [category] [description...]");
    }

    let amount =
        parse_amount(&args[0]).with_context(|| format!("Invalid amount: {}", args[0]))?;
    let category = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let description = args.get(2..).unwrap_or_default().join(" ");
    let expense = Expense::new(description.trim().to_string(), amount, category);

    // Load both stores before writing either, so a bad file records nothing.
    let expenses_path = config.expenses_path();
    let budgets_path = config.budgets_path();
    let mut expenses = persistence::load_expenses(&expenses_path)?;
    let mut budgets = persistence::load_budgets(&budgets_path)?;

    expenses.push(expense.clone());
    persistence::save_expenses(&expenses_path, &expenses)?;

    if let Some(budget) = budgets
        .iter_mut()
        .find(|b| expense.matches_category(&b.category))
    {
        budget.add_expense(expense.clone());
        if budget.is_overspent() {
            println!("Warning: budget {} is overspent", budget.category);
        }
        persistence::save_budgets(&budgets_path, &budgets)?;
    }

    println!(
        "Recorded ${:.2} in {} ({} expenses total)",
        expense.amount,
        expense.category,
        expenses.len()
    );
    Ok(())
}

fn cli_list(config: &Config) -> Result<()> {
    let expenses = persistence::load_expenses(&config.expenses_path())?;
    if expenses.is_empty() {
        println!("No expenses");
        return Ok(());
    }

    println!("{:<20} {:<16} {:>10}  Description", "Date", "Category", "Amount");
    println!("{}", "─".repeat(64));
    for exp in &expenses {
        println!(
            "{:<20} {:<16} {:>10.2}  {}",
            exp.timestamp.format("%Y-%m-%d %H:%M"),
            exp.category,
            exp.amount,
            exp.description,
        );
    }
    Ok(())
}

fn cli_summary(config: &Config) -> Result<()> {
    let expenses = persistence::load_expenses(&config.expenses_path())?;
    let totals = analytics::totals_by_category(&expenses);
    let averages = analytics::average_by_category(&expenses);

    println!("Budget Tracker — summary");
    println!("{}", "─".repeat(40));
    println!("  Expenses:   {}", expenses.len());
    println!("  Total:      ${:.2}", analytics::calculate_total(&expenses));

    if !totals.is_empty() {
        println!();
        println!("By Category:               Total    Average");
        for (name, total) in &totals {
            let average = averages.get(name).copied().unwrap_or_default();
            println!("  {name:<20} {total:>10.2} {average:>10.2}");
        }
    }
    Ok(())
}

fn cli_budget(args: &[String], config: &Config) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("set") => cli_budget_set(&args[1..], config),
        Some("show") | None => cli_budget_show(config),
        Some(other) => anyhow::bail!("Unknown budget command: {other}"),
    }
}

fn cli_budget_set(args: &[String], config: &Config) -> Result<()> {
    let [category, limit] = args else {
        anyhow::bail!("Usage: budget set <category> <limit>");
    };
    let limit = parse_amount(limit).with_context(|| format!("Invalid limit: {limit}"))?;

    let expenses = persistence::load_expenses(&config.expenses_path())?;
    let mut budget = Budget::new(category.clone(), limit);
    budget.extend(
        expenses
            .into_iter()
            .filter(|e| e.matches_category(category)),
    );

    let budgets_path = config.budgets_path();
    let mut budgets = persistence::load_budgets(&budgets_path)?;
    let lower = category.to_lowercase();
    budgets.retain(|b| b.category.to_lowercase() != lower);
    println!(
        "Budget {} set to ${:.2} ({} expenses attached)",
        budget.category,
        budget.limit,
        budget.expenses.len()
    );
    budgets.push(budget);
    persistence::save_budgets(&budgets_path, &budgets)
}

fn cli_budget_show(config: &Config) -> Result<()> {
    let budgets = persistence::load_budgets(&config.budgets_path())?;
    if budgets.is_empty() {
        println!("No budgets");
        return Ok(());
    }

    println!(
        "{:<16} {:>10} {:>10} {:>10}",
        "Category", "Limit", "Spent", "Remaining"
    );
    println!("{}", "─".repeat(50));
    for budget in &budgets {
        let flag = if budget.is_overspent() { "  OVERSPENT" } else { "" };
        println!(
            "{:<16} {:>10.2} {:>10.2} {:>10.2}{flag}",
            budget.category,
            budget.limit,
            budget.spent(),
            budget.remaining(),
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct ExportRow<'a> {
    date: String,
    description: &'a str,
    category: &'a str,
    amount: String,
}

fn cli_export(args: &[String], config: &Config) -> Result<()> {
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/budget-export.csv")
        });

    let expenses = persistence::load_expenses(&config.expenses_path())?;
    let count = export_to_csv(&output_path, &expenses)?;
    if count == 0 {
        println!("No expenses to export");
    } else {
        println!("Exported {count} expenses to {output_path}");
    }
    Ok(())
}

fn export_to_csv(path: &str, expenses: &[Expense]) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create export file: {path}"))?;
    for exp in expenses {
        wtr.serialize(ExportRow {
            date: exp.timestamp.to_rfc3339(),
            description: &exp.description,
            category: &exp.category,
            amount: format!("{:.2}", exp.amount),
        })
        .context("Failed to write CSV row")?;
    }
    wtr.flush().context("Failed to flush CSV")?;
    Ok(expenses.len())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
