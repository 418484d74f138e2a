//! CSV downloads and the printable order report.

use std::collections::BTreeMap;
use std::fmt::Write;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::customer::CustomerView;
use crate::domain::order::OrderView;
use crate::domain::status::OrderStatus;

pub const ORDERS_HEADER: &str = "Order ID,Order Number,Customer Name,Email,Phone,Services,Pickup Date,Total Amount,Status,Payment Status,Special Instructions,Created At";

pub const CUSTOMERS_HEADER: &str =
    "Customer ID,Name,Email,Phone,Total Orders,Total Spent,Last Order Date,Created At";

/// `orders_2025-09-10.csv`
pub fn download_name(kind: &str, date: NaiveDate, ext: &str) -> String {
    format!("{}_{}.{}", kind, date.format("%Y-%m-%d"), ext)
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn csv_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| quote(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv(header: &str, rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut lines = vec![header.to_string()];
    lines.extend(rows.map(|row| csv_row(&row)));
    lines.join("\n")
}

pub fn orders_csv(orders: &[OrderView]) -> String {
    csv(
        ORDERS_HEADER,
        orders.iter().map(|o| {
            vec![
                o.id.to_string(),
                o.order_number.clone(),
                o.customer_name.clone(),
                o.customer_email.clone(),
                o.customer_phone.clone().unwrap_or_default(),
                o.service_names().join("; "),
                o.pickup_date.map(|d| d.to_string()).unwrap_or_default(),
                o.total_amount.to_string(),
                o.status.label().to_string(),
                o.payment_status.to_string(),
                o.special_instructions.clone().unwrap_or_default(),
                o.created_at.to_rfc3339(),
            ]
        }),
    )
}

pub fn customers_csv(customers: &[CustomerView]) -> String {
    csv(
        CUSTOMERS_HEADER,
        customers.iter().map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.email.clone(),
                c.phone.clone().unwrap_or_default(),
                c.total_orders.to_string(),
                c.total_spent.to_string(),
                c.last_order.map(|d| d.to_rfc3339()).unwrap_or_default(),
                c.created_at.to_rfc3339(),
            ]
        }),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Self-contained HTML page meant to be printed from the browser: a summary
/// block followed by one table row per order.
pub fn orders_report_html(orders: &[OrderView], generated_at: DateTime<Utc>) -> String {
    let revenue = orders
        .iter()
        .filter(|o| o.status != OrderStatus::Cancelled)
        .fold(BigDecimal::zero(), |acc, o| acc + &o.total_amount);
    let mut breakdown: BTreeMap<&'static str, usize> = BTreeMap::new();
    for order in orders {
        *breakdown.entry(order.status.label()).or_default() += 1;
    }

    let mut html = String::new();
    // Writing into a String cannot fail.
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Orders Report</title>\n\
         <style>body{{font-family:sans-serif}}table{{border-collapse:collapse;width:100%}}\
         th,td{{border:1px solid #ccc;padding:4px 8px;text-align:left}}</style>\n</head>\n<body>\n\
         <h1>Orders Report</h1>\n<p>Generated {}</p>\n<ul>\n<li>Total orders: {}</li>\n<li>Revenue: {}</li>\n",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        orders.len(),
        revenue,
    );
    for (status, count) in &breakdown {
        let _ = writeln!(html, "<li>{}: {}</li>", escape_html(status), count);
    }
    html.push_str("</ul>\n<table>\n<thead><tr>");
    for column in ORDERS_HEADER.split(',') {
        let _ = write!(html, "<th>{}</th>", column);
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for order in orders {
        let cells = [
            order.id.to_string(),
            order.order_number.clone(),
            order.customer_name.clone(),
            order.customer_email.clone(),
            order.customer_phone.clone().unwrap_or_default(),
            order.service_names().join(", "),
            order.pickup_date.map(|d| d.to_string()).unwrap_or_default(),
            order.total_amount.to_string(),
            order.status.label().to_string(),
            order.payment_status.to_string(),
            order.special_instructions.clone().unwrap_or_default(),
            order.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ];
        html.push_str("<tr>");
        for cell in &cells {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}
