//! 启动数据装载
//!
//! 写入示例客户，并从 CSV 文件导入交易。CSV 表头固定为
//! `amount,status,transaction_date,customer_id`。

use std::path::Path;
use std::str::FromStr;

use chrono::{Months, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::memory::{InMemoryRepository, NewTransaction};
use crate::error::{Result, RewardsError};
use crate::models::Customer;

const UTF8_BOM: char = '\u{feff}';
const EXPECTED_COLUMNS: usize = 4;

/// 示例客户：(姓名, 邮箱, 电话, 地址)
const SAMPLE_CUSTOMERS: [(&str, &str, &str, &str); 5] = [
    ("John Doe", "john.doe@example.com", "+1-555-0101", "123 Main St, Anytown, USA"),
    ("Jane Smith", "jane.smith@example.com", "+1-555-0102", "456 Oak Ave, Somewhere, USA"),
    ("Robert Johnson", "robert.j@example.com", "+1-555-0103", "789 Pine Rd, Nowhere, USA"),
    ("Emily Davis", "emily.d@example.com", "+1-555-0104", "321 Elm St, Anywhere, USA"),
    ("Michael Brown", "michael.b@example.com", "+1-555-0105", "654 Maple Dr, Everywhere, USA"),
];

/// 生成示例客户，第 i 位客户的入会日期为 today 往前 i 个月
pub fn sample_customers(today: NaiveDate) -> Vec<Customer> {
    SAMPLE_CUSTOMERS
        .iter()
        .enumerate()
        .map(|(i, (name, email, phone, address))| Customer {
            id: i as i64 + 1,
            name: name.to_string(),
            email: email.to_string(),
            join_date: today
                .checked_sub_months(Months::new(i as u32))
                .unwrap_or(today),
            phone: Some(phone.to_string()),
            address: Some(address.to_string()),
        })
        .collect()
}

/// 解析交易 CSV 内容
///
/// 空行与 `#` 注释行跳过；列数不足或字段无法解析的行记录警告后跳过。
/// 内容为空或表头不以 `amount` 开头时返回错误。
pub fn parse_transactions_csv(content: &str) -> Result<Vec<NewTransaction>> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record?,
        None => {
            return Err(RewardsError::DataLoad {
                line: 0,
                reason: "CSV file is empty".to_string(),
            });
        }
    };

    let header_ok = header
        .get(0)
        .is_some_and(|first| first.to_ascii_lowercase().starts_with("amount"));
    if !header_ok {
        return Err(RewardsError::DataLoad {
            line: 1,
            reason: format!("invalid CSV header: {:?}", header),
        });
    }

    let mut transactions = Vec::new();
    for record in records {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable CSV line");
                continue;
            }
        };
        let line = record.position().map(|p| p.line() as usize).unwrap_or_default();

        if record.iter().all(str::is_empty) {
            continue;
        }

        match parse_record(&record) {
            Ok(tx) => transactions.push(tx),
            Err(reason) => warn!(line, reason = %reason, "Skipping invalid CSV line"),
        }
    }

    Ok(transactions)
}

fn parse_record(record: &csv::StringRecord) -> std::result::Result<NewTransaction, String> {
    if record.len() < EXPECTED_COLUMNS {
        return Err(format!(
            "expected {} columns, found {}",
            EXPECTED_COLUMNS,
            record.len()
        ));
    }

    let amount = Decimal::from_str(&record[0])
        .map_err(|e| format!("invalid amount {:?}: {}", &record[0], e))?;
    let status = record[1].to_string();
    let transaction_date = record[2]
        .parse::<NaiveDateTime>()
        .map_err(|e| format!("invalid transaction_date {:?}: {}", &record[2], e))?;
    let customer_id = record[3]
        .parse::<i64>()
        .map_err(|e| format!("invalid customer_id {:?}: {}", &record[3], e))?;

    Ok(NewTransaction {
        amount,
        status,
        transaction_date: Some(transaction_date),
        customer_id,
    })
}

/// 读取交易 CSV 文件
pub fn load_transactions_file(path: &Path) -> Result<Vec<NewTransaction>> {
    let content = std::fs::read_to_string(path)?;
    parse_transactions_csv(&content)
}

/// 填充内存仓储，仓储非空时对应部分跳过
pub fn seed_repository(
    repo: &InMemoryRepository,
    today: NaiveDate,
    with_sample_customers: bool,
    transactions_csv: Option<&Path>,
) -> Result<()> {
    if with_sample_customers && repo.customer_count() == 0 {
        let customers = sample_customers(today);
        let count = customers.len();
        for customer in customers {
            repo.insert_customer(customer);
        }
        info!(count, "Initialized sample customers");
    }

    if let Some(path) = transactions_csv {
        if repo.transaction_count() == 0 {
            let transactions = load_transactions_file(path)?;
            let count = repo.insert_transactions(transactions);
            info!(count, path = %path.display(), "Loaded transactions from CSV file");
        }
    }

    Ok(())
}
