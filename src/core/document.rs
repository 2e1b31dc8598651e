use crate::domain::model::Transfer;
use chrono::{Local, TimeZone};
use std::fmt::Display;

pub fn document_file_name(transfer: &Transfer) -> String {
    format!("transfer_{}.txt", transfer.id)
}

/// 產生可列印的轉移單，含逐項核對欄與簽名欄；日期以本地時間顯示
pub fn render_transfer_document(transfer: &Transfer) -> String {
    render_transfer_document_in(transfer, &Local)
}

pub fn render_transfer_document_in<Tz>(transfer: &Transfer, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut doc = format!(
        "PARTS TRANSFER DOCUMENT\n\
         ======================\n\
         Transfer ID: {}\n\
         Date: {}\n\
         \n\
         FROM LOCATION: {}\n\
         TO LOCATION: {}\n\
         \n\
         ITEMS TRANSFERRED:\n",
        transfer.id,
        transfer
            .created_at
            .with_timezone(tz)
            .format("%Y-%m-%d %H:%M:%S"),
        transfer.from_location,
        transfer.to_location,
    );

    for (i, item) in transfer.items.iter().enumerate() {
        doc.push_str(&format!(
            "\n{:2}. {} - Qty: {} [ ] Verified",
            i + 1,
            item.code,
            item.quantity
        ));
    }

    doc.push_str(&format!(
        "\n\nTOTAL ITEMS: {}\nTOTAL PART TYPES: {}",
        transfer.total_items(),
        transfer.type_count()
    ));
    doc.push_str("\n\nTRANSFER COMPLETED BY: ________________");
    doc.push_str("\nSIGNATURE: ________________  DATE: ________________");

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::normalize;
    use crate::domain::model::{LifecycleState, LineItem};
    use chrono::{TimeZone, Utc};

    fn sample_transfer() -> Transfer {
        let at = Utc.with_ymd_and_hms(2025, 2, 10, 16, 45, 9).unwrap();
        Transfer {
            id: "TXN-20250210164509".to_string(),
            from_location: "Main Warehouse".to_string(),
            to_location: "OTT19001".to_string(),
            items: vec![
                LineItem {
                    code: normalize("X1").unwrap(),
                    quantity: 3,
                    first_seen_at: at,
                },
                LineItem {
                    code: normalize("PN-7781").unwrap(),
                    quantity: 1,
                    first_seen_at: at,
                },
            ],
            created_at: at,
            state: LifecycleState::Submitted,
        }
    }

    #[test]
    fn test_document_layout() {
        let doc = render_transfer_document_in(&sample_transfer(), &Utc);
        let expected = "PARTS TRANSFER DOCUMENT
======================
Transfer ID: TXN-20250210164509
Date: 2025-02-10 16:45:09

FROM LOCATION: Main Warehouse
TO LOCATION: OTT19001

ITEMS TRANSFERRED:

 1. X1 - Qty: 3 [ ] Verified
 2. PN-7781 - Qty: 1 [ ] Verified

TOTAL ITEMS: 4
TOTAL PART TYPES: 2

TRANSFER COMPLETED BY: ________________
SIGNATURE: ________________  DATE: ________________";

        assert_eq!(doc, expected);
    }

    #[test]
    fn test_document_date_follows_timezone() {
        let plus_eight = chrono::FixedOffset::east_opt(8 * 3600).unwrap();
        let doc = render_transfer_document_in(&sample_transfer(), &plus_eight);
        assert!(doc.contains("Date: 2025-02-11 00:45:09"));
    }

    #[test]
    fn test_local_document_uses_local_date() {
        let transfer = sample_transfer();
        let local = transfer.created_at.with_timezone(&Local);
        let doc = render_transfer_document(&transfer);
        assert!(doc.contains(&format!("Date: {}", local.format("%Y-%m-%d %H:%M:%S"))));
    }

    #[test]
    fn test_document_file_name() {
        assert_eq!(
            document_file_name(&sample_transfer()),
            "transfer_TXN-20250210164509.txt"
        );
    }
}
