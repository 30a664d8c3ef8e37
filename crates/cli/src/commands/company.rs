//! `bsheet company`: company master CRUD.
//!
//! Reads merge the canonical and legacy master tables; every write goes
//! to the canonical one. Rows are addressed by looking the name up in a
//! fresh list, never by a position captured earlier.

use brokersheet_core::model::{Company, COMPANY_HEADERS, COMPANY_TABLE};
use brokersheet_core::normalize::company_from_record;
use brokersheet_store::RowStore;

use super::{load_masters, print_json, validate};
use crate::CliError;

pub fn cmd_company_add(
    store: &dyn RowStore,
    name: String,
    city: String,
    quiet: bool,
) -> Result<(), CliError> {
    let name = validate::require("--name", &name)?;
    let city = city.trim().to_string();

    store.ensure_table(COMPANY_TABLE, &COMPANY_HEADERS)?;
    store.append(COMPANY_TABLE, &[name.clone(), city])?;

    if !quiet {
        eprintln!("Added company '{}'", name);
    }
    Ok(())
}

pub fn cmd_company_list(store: &dyn RowStore, json: bool) -> Result<(), CliError> {
    let (companies, _) = load_masters(store)?;

    if json {
        print_json(&serde_json::json!(companies));
        return Ok(());
    }
    println!("{:<24} {}", "name", "city");
    for company in &companies {
        println!("{:<24} {}", company.name, company.city);
    }
    Ok(())
}

pub fn cmd_company_update(
    store: &dyn RowStore,
    name: String,
    new_name: Option<String>,
    city: Option<String>,
    quiet: bool,
) -> Result<(), CliError> {
    let name = validate::require("--name", &name)?;
    if new_name.is_none() && city.is_none() {
        return Err(CliError::usage(
            "company update needs --new-name and/or --city",
        ));
    }

    let (position, current) = find_company(store, &name)?;
    let next_name = match new_name {
        Some(n) => validate::require("--new-name", &n)?,
        None => current.name,
    };
    let next_city = city.map(|c| c.trim().to_string()).unwrap_or(current.city);

    store.update(COMPANY_TABLE, position, &[next_name.clone(), next_city])?;

    if !quiet {
        eprintln!("Updated company '{}' (row {})", next_name, position);
    }
    Ok(())
}

pub fn cmd_company_delete(store: &dyn RowStore, name: String, quiet: bool) -> Result<(), CliError> {
    let name = validate::require("--name", &name)?;
    let (position, _) = find_company(store, &name)?;
    store.delete(COMPANY_TABLE, position)?;

    if !quiet {
        eprintln!("Deleted company '{}' (was row {})", name, position);
    }
    Ok(())
}

/// Exact-name lookup in a fresh read of the canonical master.
fn find_company(store: &dyn RowStore, name: &str) -> Result<(u32, Company), CliError> {
    for record in store.list(COMPANY_TABLE)? {
        let company = company_from_record(&record);
        if company.name == name {
            return Ok((record.position, company));
        }
    }
    Err(CliError::not_found(format!("company '{name}' not found")))
}
