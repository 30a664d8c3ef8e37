//! `bsheet invoice`: compute a period brokerage invoice.

use clap::{Args, ValueEnum};

use brokersheet_core::model::fy_tables;
use brokersheet_invoice::{
    run, InvoiceInput, InvoiceMode, InvoicePayload, InvoiceRequest, Outcome, RatePolicy,
    NO_MATCH_MESSAGE,
};
use brokersheet_store::RowStore;

use super::{load_masters, load_transactions, parse_date_flag, print_json, validate};
use crate::exit_codes::EXIT_NOT_FOUND;
use crate::CliError;

#[derive(Args)]
pub struct InvoiceArgs {
    /// Company to invoice (buyer or seller side, case-insensitive)
    #[arg(long)]
    pub company: String,

    /// Range start, ISO `yyyy-mm-dd`, inclusive
    #[arg(long)]
    pub from: String,

    /// Range end, ISO `yyyy-mm-dd`, inclusive
    #[arg(long)]
    pub to: String,

    /// Brokerage rate: currency per unit, or percent under --policy percent
    #[arg(long)]
    pub rate: f64,

    #[arg(long, value_enum, default_value_t = PolicyArg::PerUnit)]
    pub policy: PolicyArg,

    /// Compute without assigning an invoice number
    #[arg(long)]
    pub preview: bool,

    /// Emit the full payload as one JSON value on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Flat currency amount per unit (current books)
    PerUnit,
    /// Percentage of transaction value (older books)
    Percent,
}

impl From<PolicyArg> for RatePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::PerUnit => RatePolicy::PerUnit,
            PolicyArg::Percent => RatePolicy::PercentOfValue,
        }
    }
}

pub fn cmd_invoice(store: &dyn RowStore, args: InvoiceArgs, quiet: bool) -> Result<(), CliError> {
    // 1. Validate the request shape
    let company = validate::require("--company", &args.company)?;
    let start = parse_date_flag("--from", &args.from)?;
    let end = parse_date_flag("--to", &args.to)?;
    if start > end {
        return Err(CliError::validation(format!(
            "--from ({start}) must not be after --to ({end})"
        )));
    }
    validate::positive("--rate", args.rate)?;

    // 2. Load every period table the range touches, plus the masters
    let tables = fy_tables(start, end);
    if !quiet {
        eprintln!("Reading {}...", tables.join(", "));
    }
    let transactions = load_transactions(store, &tables)?;
    let (companies, products) = load_masters(store)?;

    // 3. Invoice identity. The number is count-derived and therefore NOT
    //    stable: rows added or removed before generation shift it.
    let mode = if args.preview {
        InvoiceMode::Preview
    } else {
        InvoiceMode::Final {
            invoice_no: invoice_number(transactions.len()),
            invoice_date: chrono::Local::now().format("%d/%m/%Y").to_string(),
        }
    };

    let request = InvoiceRequest {
        company,
        start,
        end,
        rate: args.rate,
        policy: args.policy.into(),
        mode,
    };
    let input = InvoiceInput {
        transactions,
        companies,
        products,
    };

    // 4. Compute and report
    match run(&request, &input) {
        Outcome::Invoice(payload) => {
            if args.json {
                print_json(&Outcome::Invoice(payload).to_json());
            } else {
                render_invoice(&payload);
            }
            Ok(())
        }
        Outcome::NoMatch => {
            if args.json {
                print_json(&Outcome::NoMatch.to_json());
                // The JSON envelope already says it; keep stderr quiet.
                Err(CliError {
                    code: EXIT_NOT_FOUND,
                    message: String::new(),
                    hint: None,
                })
            } else {
                Err(CliError::not_found(NO_MATCH_MESSAGE))
            }
        }
    }
}

/// `INV-{count+1}`, zero-padded to three digits.
fn invoice_number(transaction_count: usize) -> String {
    format!("INV-{:03}", transaction_count + 1)
}

fn render_invoice(payload: &InvoicePayload) {
    let s = &payload.summary;
    match &s.company_city {
        Some(city) => println!("Invoice {} for {} ({})", s.invoice_no, s.company_name, city),
        None => println!("Invoice {} for {}", s.invoice_no, s.company_name),
    }
    println!("Date:   {}", s.invoice_date);
    println!("Period: {} to {}", s.date_range.start, s.date_range.end);
    println!("Rate:   {}", s.brokerage_rate);
    println!();

    println!(
        "{:<12} {:<18} {:<18} {:<14} {:>10} {:>12}  {}",
        "date", "buyer", "seller", "product", "qty", "amount", "remarks"
    );
    for line in &payload.transactions {
        println!(
            "{:<12} {:<18} {:<18} {:<14} {:>10} {:>12}  {}",
            line.date,
            line.buyer_company_name,
            line.seller_company_name,
            line.product,
            line.qty,
            line.amount,
            line.remarks
        );
    }
    println!();

    println!("Total qty:                {}", s.total_qty);
    println!("Brokerage amount:         {}", s.brokerage_amount);
    println!("Other-side brokerage:     {}", s.other_side_brokerage);
    println!("Other-side total payable: {}", s.other_side_total_payable);
    println!("Total payable:            {}", s.total_payable);
    if !payload.other_side_transactions.is_empty() {
        println!(
            "({} other-side transactions; use --json for the full list)",
            payload.other_side_transactions.len()
        );
    }
}
