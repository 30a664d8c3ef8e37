use chrono::NaiveDate;

use brokersheet_core::model::Transaction;
use brokersheet_core::normalize::parse_loose_number;
use brokersheet_core::resolve::{resolve_record, MasterIndex};

use crate::model::{
    DateRange, InvoiceInput, InvoiceLine, InvoiceMode, InvoicePayload, InvoiceRequest,
    InvoiceSummary, Outcome,
};

/// Compute one invoice. Stateless: every call re-derives everything from
/// the rows handed in, so preview and final figures can never drift apart.
///
/// Passes, in order:
/// 1. resolve masters into the rows (cities, product names);
/// 2. primary filter: date in range, company is buyer or seller;
/// 3. role detection: existence, not majority; both roles can be active;
/// 4. other-side filter: the opposite role of each active one, same range;
/// 5. totals, then line items for both sets.
pub fn run(request: &InvoiceRequest, input: &InvoiceInput) -> Outcome {
    let index = MasterIndex::new(&input.companies, &input.products);
    let mut rows = input.transactions.clone();
    for tx in &mut rows {
        resolve_record(tx, &index);
    }

    let in_period: Vec<&Transaction> = rows
        .iter()
        .filter(|t| in_range(t, request.start, request.end))
        .collect();

    let primary: Vec<&Transaction> = in_period
        .iter()
        .copied()
        .filter(|t| {
            same_company(&t.buyer_name, &request.company)
                || same_company(&t.seller_name, &request.company)
        })
        .collect();
    if primary.is_empty() {
        return Outcome::NoMatch;
    }

    let acted_as_buyer = primary
        .iter()
        .any(|t| same_company(&t.buyer_name, &request.company));
    let acted_as_seller = primary
        .iter()
        .any(|t| same_company(&t.seller_name, &request.company));

    // Counter-leg of a back-to-back deal: for each role the company played,
    // rows where it played the other one. One pass, so a row lands in the
    // set at most once even when both roles are active.
    let other_side: Vec<&Transaction> = in_period
        .iter()
        .copied()
        .filter(|t| {
            (acted_as_buyer && same_company(&t.seller_name, &request.company))
                || (acted_as_seller && same_company(&t.buyer_name, &request.company))
        })
        .collect();

    let total_qty: f64 = primary.iter().map(|t| t.qty).sum();
    let total_value: f64 = primary.iter().map(|t| t.qty * t.price).sum();
    let brokerage_amount = request.policy.total(total_qty, total_value, request.rate);

    // Manual override amounts live in the remarks cell of rows where the
    // company sold; unparsable remarks count as zero.
    let other_side_brokerage: f64 = primary
        .iter()
        .filter(|t| same_company(&t.seller_name, &request.company))
        .map(|t| parse_loose_number(&t.remarks))
        .sum();

    let other_side_total_qty: f64 = other_side.iter().map(|t| t.qty).sum();
    let other_side_total_payable = other_side_total_qty * request.rate;

    let (invoice_no, invoice_date) = match &request.mode {
        InvoiceMode::Preview => ("PREVIEW".to_string(), "Preview Date".to_string()),
        InvoiceMode::Final {
            invoice_no,
            invoice_date,
        } => (invoice_no.clone(), invoice_date.clone()),
    };

    let summary = InvoiceSummary {
        invoice_no,
        company_name: request.company.clone(),
        company_city: company_city(&primary, &index, &request.company),
        invoice_date,
        date_range: DateRange {
            start: request.start.format("%d/%m/%Y").to_string(),
            end: request.end.format("%d/%m/%Y").to_string(),
        },
        brokerage_rate: request.rate,
        total_qty,
        brokerage_amount,
        other_side_brokerage,
        other_side_total_payable,
        total_payable: brokerage_amount + other_side_brokerage,
    };

    Outcome::Invoice(InvoicePayload {
        success: true,
        summary,
        transactions: primary.iter().map(|t| line(t, request)).collect(),
        other_side_transactions: other_side.iter().map(|t| line(t, request)).collect(),
    })
}

fn line(t: &Transaction, request: &InvoiceRequest) -> InvoiceLine {
    // Remarks are only meaningful (and only shown) where the company sold.
    let remarks = if same_company(&t.seller_name, &request.company) {
        t.remarks.clone()
    } else {
        String::new()
    };
    InvoiceLine {
        date: display_date(&t.date),
        buyer_company_name: t.buyer_name.clone(),
        buyer_company_city: t.buyer_city.clone(),
        seller_company_name: t.seller_name.clone(),
        seller_company_city: t.seller_city.clone(),
        product: t.product_name.clone(),
        product_code: t.product_code.clone(),
        qty: t.qty,
        price: t.price,
        rate: request.rate,
        amount: request.policy.line_amount(t.qty, t.price, request.rate),
        remarks,
    }
}

/// The invoice header city: the row's own city cell for the company's role
/// wins, then an exact master lookup, then nothing.
fn company_city(
    primary: &[&Transaction],
    index: &MasterIndex<'_>,
    company: &str,
) -> Option<String> {
    for t in primary {
        if same_company(&t.buyer_name, company) && !t.buyer_city.is_empty() {
            return Some(t.buyer_city.clone());
        }
        if same_company(&t.seller_name, company) && !t.seller_city.is_empty() {
            return Some(t.seller_city.clone());
        }
    }
    index
        .company_city(company)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

fn same_company(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Rows whose date cell does not parse are invisible to invoicing; they
/// still show up in plain listings.
fn in_range(t: &Transaction, start: NaiveDate, end: NaiveDate) -> bool {
    match t.parsed_date() {
        Some(d) => start <= d && d <= end,
        None => false,
    }
}

/// Display form for line items: ISO reformats to `dd/mm/yyyy`; a value
/// already in display form, or anything unparseable, passes through.
fn display_date(value: &str) -> String {
    let v = value.trim();
    match NaiveDate::parse_from_str(v, "%Y-%m-%d") {
        Ok(d) => d.format("%d/%m/%Y").to_string(),
        Err(_) => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::RatePolicy;
    use brokersheet_core::model::{Company, Product};

    fn tx(
        position: u32,
        date: &str,
        buyer: &str,
        seller: &str,
        qty: f64,
        remarks: &str,
    ) -> Transaction {
        Transaction {
            position,
            date: date.into(),
            buyer_name: buyer.into(),
            buyer_city: "".into(),
            seller_name: seller.into(),
            seller_city: "".into(),
            product_name: "Wheat".into(),
            product_code: "WHT".into(),
            qty,
            price: 0.0,
            remarks: remarks.into(),
        }
    }

    fn may_2024(company: &str) -> InvoiceRequest {
        InvoiceRequest {
            company: company.into(),
            start: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            rate: 10.0,
            policy: RatePolicy::PerUnit,
            mode: InvoiceMode::Preview,
        }
    }

    fn back_to_back() -> InvoiceInput {
        InvoiceInput {
            transactions: vec![
                tx(2, "2024-05-01", "Acme", "Beta", 100.0, ""),
                tx(3, "2024-05-15", "Beta", "Acme", 50.0, "25.5"),
            ],
            companies: vec![Company {
                name: "Acme".into(),
                city: "Pune".into(),
            }],
            products: vec![],
        }
    }

    fn payload(outcome: Outcome) -> InvoicePayload {
        match outcome {
            Outcome::Invoice(p) => p,
            Outcome::NoMatch => panic!("expected an invoice"),
        }
    }

    #[test]
    fn back_to_back_deal_totals() {
        let p = payload(run(&may_2024("Acme"), &back_to_back()));
        assert_eq!(p.summary.total_qty, 150.0);
        assert_eq!(p.summary.brokerage_amount, 1500.0);
        assert_eq!(p.summary.other_side_brokerage, 25.5);
        assert_eq!(p.summary.total_payable, 1525.5);
        // Acme played both roles, so the other side is both rows too.
        assert_eq!(p.transactions.len(), 2);
        assert_eq!(p.other_side_transactions.len(), 2);
        assert_eq!(p.summary.other_side_total_payable, 1500.0);
    }

    #[test]
    fn unknown_company_is_no_match() {
        assert_eq!(run(&may_2024("Gamma"), &back_to_back()), Outcome::NoMatch);
    }

    #[test]
    fn out_of_range_rows_are_no_match_not_zero() {
        let mut req = may_2024("Acme");
        req.start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        req.end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert_eq!(run(&req, &back_to_back()), Outcome::NoMatch);
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let input = InvoiceInput {
            transactions: vec![
                tx(2, "2024-05-01", "Acme", "Beta", 10.0, ""),
                tx(3, "2024-05-31", "Acme", "Beta", 20.0, ""),
                tx(4, "2024-04-30", "Acme", "Beta", 99.0, ""),
                tx(5, "2024-06-01", "Acme", "Beta", 99.0, ""),
            ],
            ..Default::default()
        };
        let p = payload(run(&may_2024("Acme"), &input));
        assert_eq!(p.summary.total_qty, 30.0);
    }

    #[test]
    fn company_match_is_case_insensitive() {
        let p = payload(run(&may_2024("acme"), &back_to_back()));
        assert_eq!(p.summary.total_qty, 150.0);
    }

    #[test]
    fn buyer_only_company_has_empty_other_side() {
        let input = InvoiceInput {
            transactions: vec![tx(2, "2024-05-01", "Acme", "Beta", 100.0, "9.9")],
            ..Default::default()
        };
        let p = payload(run(&may_2024("Acme"), &input));
        assert!(p.other_side_transactions.is_empty());
        assert_eq!(p.summary.other_side_total_payable, 0.0);
        // Remarks on a row where Acme bought do not count as an override.
        assert_eq!(p.summary.other_side_brokerage, 0.0);
        assert_eq!(p.summary.total_payable, 1000.0);
    }

    #[test]
    fn remarks_overrides_sum_only_on_seller_rows() {
        let input = InvoiceInput {
            transactions: vec![
                tx(2, "2024-05-01", "Beta", "Acme", 10.0, "25.5 paid"),
                tx(3, "2024-05-02", "Beta", "Acme", 10.0, "not a number"),
                tx(4, "2024-05-03", "Acme", "Beta", 10.0, "7"),
            ],
            ..Default::default()
        };
        let p = payload(run(&may_2024("Acme"), &input));
        assert_eq!(p.summary.other_side_brokerage, 25.5);
        // The buyer-row remark is blanked on the line item too.
        let buyer_line = p
            .transactions
            .iter()
            .find(|l| l.buyer_company_name == "Acme")
            .unwrap();
        assert_eq!(buyer_line.remarks, "");
        let seller_line = p
            .transactions
            .iter()
            .find(|l| l.date == "01/05/2024")
            .unwrap();
        assert_eq!(seller_line.remarks, "25.5 paid");
    }

    #[test]
    fn unparseable_dates_never_match() {
        let input = InvoiceInput {
            transactions: vec![
                tx(2, "sometime in May", "Acme", "Beta", 100.0, ""),
                tx(3, "2024-05-15", "Acme", "Beta", 50.0, ""),
            ],
            ..Default::default()
        };
        let p = payload(run(&may_2024("Acme"), &input));
        assert_eq!(p.summary.total_qty, 50.0);
        assert_eq!(p.transactions.len(), 1);
    }

    #[test]
    fn display_dates_reformat_iso_and_pass_through_the_rest() {
        assert_eq!(display_date("2024-05-01"), "01/05/2024");
        assert_eq!(display_date("01/05/2024"), "01/05/2024");
        assert_eq!(display_date("sometime"), "sometime");
    }

    #[test]
    fn preview_and_final_agree_on_figures() {
        let preview = payload(run(&may_2024("Acme"), &back_to_back()));
        let mut req = may_2024("Acme");
        req.mode = InvoiceMode::Final {
            invoice_no: "INV-003".into(),
            invoice_date: "15/06/2024".into(),
        };
        let fin = payload(run(&req, &back_to_back()));

        assert_eq!(preview.summary.invoice_no, "PREVIEW");
        assert_eq!(preview.summary.invoice_date, "Preview Date");
        assert_eq!(fin.summary.invoice_no, "INV-003");
        assert_eq!(fin.summary.invoice_date, "15/06/2024");
        assert_eq!(preview.summary.total_payable, fin.summary.total_payable);
        assert_eq!(preview.transactions, fin.transactions);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let a = run(&may_2024("Acme"), &back_to_back());
        let b = run(&may_2024("Acme"), &back_to_back());
        assert_eq!(a, b);
    }

    #[test]
    fn summary_city_comes_from_master_when_rows_are_blank() {
        let p = payload(run(&may_2024("Acme"), &back_to_back()));
        assert_eq!(p.summary.company_city.as_deref(), Some("Pune"));
    }

    #[test]
    fn summary_city_prefers_the_row_cell() {
        let mut input = back_to_back();
        input.transactions[0].buyer_city = "Nashik".into();
        let p = payload(run(&may_2024("Acme"), &input));
        assert_eq!(p.summary.company_city.as_deref(), Some("Nashik"));
    }

    #[test]
    fn summary_city_is_absent_when_unknown() {
        let mut input = back_to_back();
        input.companies.clear();
        let p = payload(run(&may_2024("Acme"), &input));
        assert_eq!(p.summary.company_city, None);
    }

    #[test]
    fn percent_policy_bills_on_value() {
        let mut input = InvoiceInput {
            transactions: vec![tx(2, "2024-05-01", "Acme", "Beta", 100.0, "")],
            ..Default::default()
        };
        input.transactions[0].price = 2500.0;
        let mut req = may_2024("Acme");
        req.rate = 0.5;
        req.policy = RatePolicy::PercentOfValue;
        let p = payload(run(&req, &input));
        // 100 × 2500 × 0.5% = 1250
        assert_eq!(p.summary.brokerage_amount, 1250.0);
        assert_eq!(p.transactions[0].amount, 1250.0);
    }

    #[test]
    fn lines_carry_resolved_product_and_cities() {
        let input = InvoiceInput {
            transactions: vec![{
                let mut t = tx(2, "2024-05-01", "Acme", "Beta", 100.0, "");
                t.product_name = "WHT".into();
                t.product_code = "".into();
                t
            }],
            companies: vec![
                Company {
                    name: "Acme".into(),
                    city: "Pune".into(),
                },
                Company {
                    name: "Beta".into(),
                    city: "Indore".into(),
                },
            ],
            products: vec![Product {
                code: "WHT".into(),
                name: "Wheat".into(),
            }],
        };
        let p = payload(run(&may_2024("Acme"), &input));
        let l = &p.transactions[0];
        assert_eq!(l.product, "Wheat");
        assert_eq!(l.product_code, "WHT");
        assert_eq!(l.buyer_company_city, "Pune");
        assert_eq!(l.seller_company_city, "Indore");
    }

    #[test]
    fn wire_json_shape() {
        let json = run(&may_2024("Acme"), &back_to_back()).to_json();
        assert_eq!(json["success"], true);
        assert_eq!(json["summary"]["totalQty"], 150.0);
        assert_eq!(json["summary"]["brokerageAmount"], 1500.0);
        assert_eq!(json["summary"]["otherSideBrokerage"], 25.5);
        assert_eq!(json["summary"]["totalPayable"], 1525.5);
        assert_eq!(json["summary"]["dateRange"]["start"], "01/05/2024");
        assert_eq!(json["transactions"][0]["buyerCompanyName"], "Acme");
        assert_eq!(json["transactions"][0]["rate"], 10.0);
        assert_eq!(json["transactions"][0]["amount"], 1000.0);
    }
}
