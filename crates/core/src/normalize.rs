use std::collections::HashMap;

use crate::model::{Company, Product, Record, Transaction};

// Ordered alias chains. Period tables have gone through several header
// conventions (truncated camelCase, full camelCase, display headings), so
// each logical field accepts every spelling seen in live books. First
// non-empty value wins; a present-but-blank cell falls through.

const BUYER_ALIASES: [&str; 4] = ["buyerCompanyN", "buyerCompanyName", "Buyer Company", "Buyer"];
const SELLER_ALIASES: [&str; 4] = [
    "sellerCompanyN",
    "sellerCompanyName",
    "Seller Company",
    "Seller",
];
const BUYER_CITY_ALIASES: [&str; 2] = ["buyerCompanyCity", "Buyer City"];
const SELLER_CITY_ALIASES: [&str; 2] = ["sellerCompanyCity", "Seller City"];
const DATE_ALIASES: [&str; 2] = ["date", "Date"];
const PRODUCT_ALIASES: [&str; 2] = ["product", "Product"];
const PRODUCT_CODE_ALIASES: [&str; 2] = ["productCode", "Product Code"];
const QTY_ALIASES: [&str; 3] = ["qty", "Qty", "quantity"];
const PRICE_ALIASES: [&str; 2] = ["price", "Price"];
const REMARKS_ALIASES: [&str; 2] = ["remarks", "Remarks"];

const COMPANY_NAME_ALIASES: [&str; 2] = ["companyName", "Name"];
const COMPANY_CITY_ALIASES: [&str; 2] = ["companyCity", "City"];
const PRODUCT_MASTER_CODE_ALIASES: [&str; 2] = ["productCode", "Product Code"];
const PRODUCT_MASTER_NAME_ALIASES: [&str; 2] = ["productName", "Product Name"];

fn pick(fields: &HashMap<String, String>, aliases: &[&str]) -> String {
    aliases
        .iter()
        .filter_map(|a| fields.get(*a))
        .find(|v| !v.is_empty())
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Strict cell-to-number coercion: the whole trimmed cell must be a finite
/// number, anything else is 0. Used for qty/price, where "100 bags" means
/// the cell was filled free-hand and must not abort the read.
pub fn parse_cell_number(value: &str) -> f64 {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Loose coercion: longest leading numeric prefix, 0 when there is none.
/// Remarks cells carry values like "25.5 paid by other side".
pub fn parse_loose_number(value: &str) -> f64 {
    let v = value.trim();
    if let Ok(n) = v.parse::<f64>() {
        return if n.is_finite() { n } else { 0.0 };
    }
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in v.char_indices() {
        match c {
            '+' | '-' if i == 0 => end = i + 1,
            '0'..='9' => {
                seen_digit = true;
                end = i + 1;
            }
            '.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return 0.0;
    }
    v[..end].parse().unwrap_or(0.0)
}

/// Map a raw header-keyed record onto the canonical transaction shape.
/// Total: every record normalizes, malformed cells degrade to "" / 0.
/// Master-table cross-references (cities, product names) are a separate
/// pass, see [`crate::resolve`].
pub fn normalize_record(record: &Record) -> Transaction {
    let f = &record.fields;
    Transaction {
        position: record.position,
        date: pick(f, &DATE_ALIASES),
        buyer_name: pick(f, &BUYER_ALIASES),
        buyer_city: pick(f, &BUYER_CITY_ALIASES),
        seller_name: pick(f, &SELLER_ALIASES),
        seller_city: pick(f, &SELLER_CITY_ALIASES),
        product_name: pick(f, &PRODUCT_ALIASES),
        product_code: pick(f, &PRODUCT_CODE_ALIASES),
        qty: parse_cell_number(&pick(f, &QTY_ALIASES)),
        price: parse_cell_number(&pick(f, &PRICE_ALIASES)),
        remarks: pick(f, &REMARKS_ALIASES),
    }
}

/// Company master rows, canonical (`companyName`/`companyCity`) or legacy
/// (`Name`/`City`) headers.
pub fn company_from_record(record: &Record) -> Company {
    Company {
        name: pick(&record.fields, &COMPANY_NAME_ALIASES),
        city: pick(&record.fields, &COMPANY_CITY_ALIASES),
    }
}

/// Product master rows, canonical or legacy headers.
pub fn product_from_record(record: &Record) -> Product {
    Product {
        code: pick(&record.fields, &PRODUCT_MASTER_CODE_ALIASES),
        name: pick(&record.fields, &PRODUCT_MASTER_NAME_ALIASES),
    }
}

/// Order a transaction's values to match a live header row, for append and
/// update writes. The header spelling decides which field lands in which
/// column; headers nothing maps to get an empty cell.
pub fn row_values(tx: &Transaction, headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| field_for_header(tx, h)).collect()
}

fn field_for_header(tx: &Transaction, header: &str) -> String {
    let h = header.trim();
    if DATE_ALIASES.contains(&h) {
        tx.date.clone()
    } else if BUYER_ALIASES.contains(&h) {
        tx.buyer_name.clone()
    } else if BUYER_CITY_ALIASES.contains(&h) {
        tx.buyer_city.clone()
    } else if SELLER_ALIASES.contains(&h) {
        tx.seller_name.clone()
    } else if SELLER_CITY_ALIASES.contains(&h) {
        tx.seller_city.clone()
    } else if PRODUCT_ALIASES.contains(&h) {
        tx.product_name.clone()
    } else if PRODUCT_CODE_ALIASES.contains(&h) {
        tx.product_code.clone()
    } else if QTY_ALIASES.contains(&h) {
        tx.qty.to_string()
    } else if PRICE_ALIASES.contains(&h) {
        tx.price.to_string()
    } else if REMARKS_ALIASES.contains(&h) {
        tx.remarks.clone()
    } else {
        String::new()
    }
}
