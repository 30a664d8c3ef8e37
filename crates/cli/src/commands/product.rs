//! `bsheet product`: product master CRUD, keyed by product code.

use brokersheet_core::model::{Product, PRODUCT_HEADERS, PRODUCT_TABLE};
use brokersheet_core::normalize::product_from_record;
use brokersheet_store::RowStore;

use super::{load_masters, print_json, validate};
use crate::CliError;

pub fn cmd_product_add(
    store: &dyn RowStore,
    code: String,
    name: String,
    quiet: bool,
) -> Result<(), CliError> {
    let code = validate::require("--code", &code)?;
    let name = validate::require("--name", &name)?;

    store.ensure_table(PRODUCT_TABLE, &PRODUCT_HEADERS)?;
    store.append(PRODUCT_TABLE, &[code.clone(), name])?;

    if !quiet {
        eprintln!("Added product '{}'", code);
    }
    Ok(())
}

pub fn cmd_product_list(store: &dyn RowStore, json: bool) -> Result<(), CliError> {
    let (_, products) = load_masters(store)?;

    if json {
        print_json(&serde_json::json!(products));
        return Ok(());
    }
    println!("{:<12} {}", "code", "name");
    for product in &products {
        println!("{:<12} {}", product.code, product.name);
    }
    Ok(())
}

pub fn cmd_product_update(
    store: &dyn RowStore,
    code: String,
    new_code: Option<String>,
    name: Option<String>,
    quiet: bool,
) -> Result<(), CliError> {
    let code = validate::require("--code", &code)?;
    if new_code.is_none() && name.is_none() {
        return Err(CliError::usage(
            "product update needs --new-code and/or --name",
        ));
    }

    let (position, current) = find_product(store, &code)?;
    let next_code = match new_code {
        Some(c) => validate::require("--new-code", &c)?,
        None => current.code,
    };
    let next_name = match name {
        Some(n) => validate::require("--name", &n)?,
        None => current.name,
    };

    store.update(PRODUCT_TABLE, position, &[next_code.clone(), next_name])?;

    if !quiet {
        eprintln!("Updated product '{}' (row {})", next_code, position);
    }
    Ok(())
}

pub fn cmd_product_delete(store: &dyn RowStore, code: String, quiet: bool) -> Result<(), CliError> {
    let code = validate::require("--code", &code)?;
    let (position, _) = find_product(store, &code)?;
    store.delete(PRODUCT_TABLE, position)?;

    if !quiet {
        eprintln!("Deleted product '{}' (was row {})", code, position);
    }
    Ok(())
}

fn find_product(store: &dyn RowStore, code: &str) -> Result<(u32, Product), CliError> {
    for record in store.list(PRODUCT_TABLE)? {
        let product = product_from_record(&record);
        if product.code == code {
            return Ok((record.position, product));
        }
    }
    Err(CliError::not_found(format!("product '{code}' not found")))
}
