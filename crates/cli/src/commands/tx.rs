//! `bsheet tx`: transaction CRUD against the period tables.

use std::path::PathBuf;

use clap::Args;

use brokersheet_core::model::{fy_table, parse_ledger_date, Transaction, TRANSACTION_HEADERS};
use brokersheet_core::normalize::{normalize_record, row_values};
use brokersheet_core::resolve::{resolve_record, MasterIndex};
use brokersheet_store::RowStore;

use super::{load_masters, parse_date_flag, print_json, validate, write_transactions_csv};
use crate::CliError;

#[derive(Args)]
pub struct TxAddArgs {
    /// Transaction date, ISO `yyyy-mm-dd`; picks the financial-year table
    #[arg(long)]
    pub date: String,

    #[arg(long)]
    pub buyer: String,

    #[arg(long)]
    pub seller: String,

    /// City override for this row; left empty, it derives from the master
    #[arg(long, default_value = "")]
    pub buyer_city: String,

    #[arg(long, default_value = "")]
    pub seller_city: String,

    /// Product name, or a bare code to resolve against the product master
    #[arg(long, default_value = "")]
    pub product: String,

    #[arg(long, default_value = "")]
    pub product_code: String,

    #[arg(long)]
    pub qty: f64,

    #[arg(long, default_value_t = 0.0)]
    pub price: f64,

    #[arg(long, default_value = "")]
    pub remarks: String,
}

pub fn cmd_tx_add(store: &dyn RowStore, args: TxAddArgs, quiet: bool) -> Result<(), CliError> {
    // 1. Validate before anything touches the book
    let date = parse_date_flag("--date", &args.date)?;
    let buyer = validate::require("--buyer", &args.buyer)?;
    let seller = validate::require("--seller", &args.seller)?;
    validate::positive("--qty", args.qty)?;
    validate::non_negative("--price", args.price)?;

    let mut tx = Transaction {
        position: 0,
        date: date.format("%Y-%m-%d").to_string(),
        buyer_name: buyer,
        buyer_city: args.buyer_city.trim().to_string(),
        seller_name: seller,
        seller_city: args.seller_city.trim().to_string(),
        product_name: args.product.trim().to_string(),
        product_code: args.product_code.trim().to_string(),
        qty: args.qty,
        price: args.price,
        remarks: args.remarks.trim().to_string(),
    };

    // 2. Re-derive cities and product name from current masters; caller
    //    input is not trusted for reference data it left blank
    let (companies, products) = load_masters(store)?;
    resolve_record(&mut tx, &MasterIndex::new(&companies, &products));

    // 3. Bootstrap the period table, then order values by its live headers
    let table = fy_table(date);
    store.ensure_table(&table, &TRANSACTION_HEADERS)?;
    let headers = store.headers(&table)?;
    store.append(&table, &row_values(&tx, &headers))?;

    if !quiet {
        eprintln!(
            "Recorded {} -> {} ({} x {}) in '{}'",
            tx.buyer_name, tx.seller_name, tx.qty, tx.price, table
        );
    }
    Ok(())
}

pub fn cmd_tx_list(
    store: &dyn RowStore,
    period: Option<String>,
    json: bool,
    csv: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let table = period.unwrap_or_else(|| fy_table(chrono::Local::now().date_naive()));
    let records = store.list(&table)?;

    let (companies, products) = load_masters(store)?;
    let index = MasterIndex::new(&companies, &products);
    let transactions: Vec<Transaction> = records
        .iter()
        .map(|r| {
            let mut tx = normalize_record(r);
            resolve_record(&mut tx, &index);
            tx
        })
        .collect();

    if let Some(path) = csv {
        let out_label = write_transactions_csv(&transactions, &Some(path))?;
        if !quiet {
            eprintln!(
                "Wrote {} transactions from '{}' to {}",
                transactions.len(),
                table,
                out_label
            );
        }
        return Ok(());
    }

    if json {
        print_json(&serde_json::json!(transactions));
        return Ok(());
    }

    println!(
        "{:<5} {:<12} {:<18} {:<18} {:<14} {:>10} {:>10}",
        "pos", "date", "buyer", "seller", "product", "qty", "price"
    );
    for tx in &transactions {
        println!(
            "{:<5} {:<12} {:<18} {:<18} {:<14} {:>10} {:>10}",
            tx.position, tx.date, tx.buyer_name, tx.seller_name, tx.product_name, tx.qty, tx.price
        );
    }
    if !quiet {
        eprintln!("{} transactions in '{}'", transactions.len(), table);
    }
    Ok(())
}

pub fn cmd_tx_update(
    store: &dyn RowStore,
    period: Option<String>,
    position: u32,
    fields: Vec<String>,
    quiet: bool,
) -> Result<(), CliError> {
    let overrides = parse_field_args(&fields)?;
    let table = period.unwrap_or_else(|| fy_table(chrono::Local::now().date_naive()));

    // Fresh read: positions captured earlier may be stale after a delete.
    let records = store.list(&table)?;
    let record = records
        .iter()
        .find(|r| r.position == position)
        .ok_or_else(|| {
            CliError::not_found(format!("no row at position {position} in '{table}'"))
        })?;

    let mut tx = normalize_record(record);
    for (name, value) in &overrides {
        apply_field(&mut tx, name, value)?;
    }
    // A renamed party's city is stale unless the caller set it too; clear
    // it so resolution below re-derives from the master.
    if has_field(&overrides, "buyerCompanyName") && !has_field(&overrides, "buyerCompanyCity") {
        tx.buyer_city.clear();
    }
    if has_field(&overrides, "sellerCompanyName") && !has_field(&overrides, "sellerCompanyCity") {
        tx.seller_city.clear();
    }
    let (companies, products) = load_masters(store)?;
    resolve_record(&mut tx, &MasterIndex::new(&companies, &products));

    let headers = store.headers(&table)?;
    store.update(&table, position, &row_values(&tx, &headers))?;

    if !quiet {
        eprintln!("Updated row {} in '{}'", position, table);
    }
    Ok(())
}

pub fn cmd_tx_delete(
    store: &dyn RowStore,
    period: Option<String>,
    position: u32,
    quiet: bool,
) -> Result<(), CliError> {
    let table = period.unwrap_or_else(|| fy_table(chrono::Local::now().date_naive()));
    store.delete(&table, position)?;
    if !quiet {
        eprintln!(
            "Deleted row {} from '{}'; later rows shifted up one position",
            position, table
        );
    }
    Ok(())
}

fn parse_field_args(fields: &[String]) -> Result<Vec<(String, String)>, CliError> {
    fields
        .iter()
        .map(|raw| {
            raw.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .ok_or_else(|| {
                    CliError::usage(format!("--field expects NAME=VALUE, got {raw:?}"))
                })
        })
        .collect()
}

fn has_field(overrides: &[(String, String)], name: &str) -> bool {
    overrides.iter().any(|(k, _)| k == name)
}

fn apply_field(tx: &mut Transaction, name: &str, value: &str) -> Result<(), CliError> {
    match name {
        "date" => {
            if parse_ledger_date(value).is_none() {
                return Err(CliError::validation(format!(
                    "date must be yyyy-mm-dd or dd/mm/yyyy, got {value:?}"
                )));
            }
            tx.date = value.to_string();
        }
        "buyerCompanyName" => tx.buyer_name = value.to_string(),
        "buyerCompanyCity" => tx.buyer_city = value.to_string(),
        "sellerCompanyName" => tx.seller_name = value.to_string(),
        "sellerCompanyCity" => tx.seller_city = value.to_string(),
        "product" => tx.product_name = value.to_string(),
        "productCode" => tx.product_code = value.to_string(),
        "qty" => {
            let qty: f64 = value
                .parse()
                .map_err(|_| CliError::validation(format!("qty must be a number, got {value:?}")))?;
            validate::positive("qty", qty)?;
            tx.qty = qty;
        }
        "price" => {
            let price: f64 = value.parse().map_err(|_| {
                CliError::validation(format!("price must be a number, got {value:?}"))
            })?;
            validate::non_negative("price", price)?;
            tx.price = price;
        }
        "remarks" => tx.remarks = value.to_string(),
        other => {
            return Err(CliError::usage(format!(
                "unknown field '{}' (expected one of: {})",
                other,
                TRANSACTION_HEADERS.join(", ")
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokersheet_core::model::{COMPANY_TABLE, PRODUCT_TABLE};
    use brokersheet_store::MemoryStore;

    fn add_args(date: &str, buyer: &str, seller: &str, qty: f64) -> TxAddArgs {
        TxAddArgs {
            date: date.into(),
            buyer: buyer.into(),
            seller: seller.into(),
            buyer_city: "".into(),
            seller_city: "".into(),
            product: "".into(),
            product_code: "WHT".into(),
            qty,
            price: 2500.0,
            remarks: "".into(),
        }
    }

    fn seeded_masters() -> MemoryStore {
        MemoryStore::new()
            .with_table(
                COMPANY_TABLE,
                &["companyName", "companyCity"],
                &[&["Acme", "Pune"], &["Beta", "Indore"]],
            )
            .with_table(
                PRODUCT_TABLE,
                &["productCode", "productName"],
                &[&["WHT", "Wheat"]],
            )
    }

    #[test]
    fn add_then_list_round_trips_the_canonical_record() {
        let store = seeded_masters();
        cmd_tx_add(&store, add_args("2024-05-01", "Acme", "Beta", 100.0), true).unwrap();

        let records = store.list("FY2024-25").unwrap();
        assert_eq!(records.len(), 1);
        let tx = normalize_record(&records[0]);
        assert_eq!(tx.position, 2);
        assert_eq!(tx.date, "2024-05-01");
        assert_eq!(tx.buyer_name, "Acme");
        // Derived from masters on the write path, not caller input.
        assert_eq!(tx.buyer_city, "Pune");
        assert_eq!(tx.seller_city, "Indore");
        assert_eq!(tx.product_name, "Wheat");
        assert_eq!(tx.qty, 100.0);
        assert_eq!(tx.price, 2500.0);
    }

    #[test]
    fn add_books_into_the_fy_of_its_date() {
        let store = seeded_masters();
        cmd_tx_add(&store, add_args("2024-02-10", "Acme", "Beta", 10.0), true).unwrap();
        assert_eq!(store.list("FY2023-24").unwrap().len(), 1);
    }

    #[test]
    fn add_rejects_bad_input_without_writing() {
        let store = seeded_masters();
        let err = cmd_tx_add(&store, add_args("2024-05-01", " ", "Beta", 10.0), true).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_VALIDATION);

        let err = cmd_tx_add(&store, add_args("2024-05-01", "Acme", "Beta", 0.0), true).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_VALIDATION);

        let err = cmd_tx_add(&store, add_args("05/01/2024", "Acme", "Beta", 10.0), true).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);

        assert!(store.list("FY2024-25").is_err(), "table never created");
    }

    #[test]
    fn update_overwrites_named_fields_and_rederives_cities() {
        let store = seeded_masters();
        cmd_tx_add(&store, add_args("2024-05-01", "Acme", "Beta", 100.0), true).unwrap();

        cmd_tx_update(
            &store,
            Some("FY2024-25".into()),
            2,
            vec!["qty=125".into(), "buyerCompanyName=Beta".into()],
            true,
        )
        .unwrap();

        let tx = normalize_record(&store.list("FY2024-25").unwrap()[0]);
        assert_eq!(tx.qty, 125.0);
        assert_eq!(tx.buyer_name, "Beta");
        assert_eq!(tx.buyer_city, "Indore");
    }

    #[test]
    fn update_unknown_field_is_a_usage_error() {
        let store = seeded_masters();
        cmd_tx_add(&store, add_args("2024-05-01", "Acme", "Beta", 100.0), true).unwrap();
        let err = cmd_tx_update(
            &store,
            Some("FY2024-25".into()),
            2,
            vec!["colour=red".into()],
            true,
        )
        .unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
        assert!(err.message.contains("colour"));
    }

    #[test]
    fn update_at_stale_position_is_not_found() {
        let store = seeded_masters();
        cmd_tx_add(&store, add_args("2024-05-01", "Acme", "Beta", 100.0), true).unwrap();
        let err = cmd_tx_update(
            &store,
            Some("FY2024-25".into()),
            9,
            vec!["qty=1".into()],
            true,
        )
        .unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_NOT_FOUND);
    }

    #[test]
    fn delete_shifts_positions() {
        let store = seeded_masters();
        cmd_tx_add(&store, add_args("2024-05-01", "Acme", "Beta", 1.0), true).unwrap();
        cmd_tx_add(&store, add_args("2024-05-02", "Acme", "Beta", 2.0), true).unwrap();
        cmd_tx_add(&store, add_args("2024-05-03", "Acme", "Beta", 3.0), true).unwrap();

        cmd_tx_delete(&store, Some("FY2024-25".into()), 3, true).unwrap();

        let records = store.list("FY2024-25").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].position, 3);
        assert_eq!(normalize_record(&records[1]).qty, 3.0);
    }

    #[test]
    fn delete_of_header_row_is_rejected() {
        let store = seeded_masters();
        let err = cmd_tx_delete(&store, Some(COMPANY_TABLE.into()), 1, true).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_VALIDATION);
    }

    #[test]
    fn field_args_parse_and_reject_malformed() {
        let parsed = parse_field_args(&["qty=5".into(), "remarks=25.5 paid".into()]).unwrap();
        assert_eq!(parsed[0], ("qty".into(), "5".into()));
        assert_eq!(parsed[1], ("remarks".into(), "25.5 paid".into()));
        assert!(parse_field_args(&["qty".into()]).is_err());
    }
}
