use std::collections::HashMap;

use crate::model::{Company, Product, Transaction};

/// Master-table lookups, built once per request from freshly read rows.
/// Company lookup is exact and case-sensitive; the first row wins on a
/// duplicate name. Product lookup is by code; the last row wins, matching
/// how the masters behave when a code is re-entered.
pub struct MasterIndex<'a> {
    companies: HashMap<&'a str, &'a Company>,
    products: HashMap<&'a str, &'a str>,
}

impl<'a> MasterIndex<'a> {
    pub fn new(companies: &'a [Company], products: &'a [Product]) -> Self {
        let mut by_name: HashMap<&str, &Company> = HashMap::new();
        for company in companies {
            by_name.entry(company.name.as_str()).or_insert(company);
        }
        let mut by_code: HashMap<&str, &str> = HashMap::new();
        for product in products {
            if !product.code.is_empty() {
                by_code.insert(product.code.as_str(), product.name.as_str());
            }
        }
        Self {
            companies: by_name,
            products: by_code,
        }
    }

    pub fn company_city(&self, name: &str) -> Option<&'a str> {
        self.companies.get(name).map(|c| c.city.as_str())
    }

    pub fn product_name(&self, code: &str) -> Option<&'a str> {
        self.products.get(code).copied()
    }
}

/// Fill in what the row itself could not say: a product name for a bare
/// code, a code for a product cell that actually holds one, and cities for
/// companies the row names. A failed lookup leaves the field as it was.
pub fn resolve_record(tx: &mut Transaction, index: &MasterIndex<'_>) {
    if tx.product_name.is_empty() && !tx.product_code.is_empty() {
        if let Some(name) = index.product_name(&tx.product_code) {
            tx.product_name = name.to_string();
        }
    }
    // Old books wrote the code into the product column itself; when the row
    // has no separate code, try the product cell as a candidate code.
    if tx.product_code.is_empty() && !tx.product_name.is_empty() {
        if let Some(name) = index.product_name(&tx.product_name) {
            tx.product_code = std::mem::replace(&mut tx.product_name, name.to_string());
        }
    }
    if tx.buyer_city.is_empty() && !tx.buyer_name.is_empty() {
        if let Some(city) = index.company_city(&tx.buyer_name) {
            tx.buyer_city = city.to_string();
        }
    }
    if tx.seller_city.is_empty() && !tx.seller_name.is_empty() {
        if let Some(city) = index.company_city(&tx.seller_name) {
            tx.seller_city = city.to_string();
        }
    }
}
