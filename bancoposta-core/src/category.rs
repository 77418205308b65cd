//! Transaction categories and the OFX transaction-type codes they map to

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of narration categories recognised in BancoPosta exports
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    /// "BONIFICO A VOSTRO FAVORE" / "VOSTRA DISPOS. DI BONIFICO"
    #[serde(rename = "transfer")]
    Transfer,
    /// "POSTAGIRO": transfer between two BancoPosta accounts
    #[serde(rename = "internal-transfer")]
    InternalTransfer,
    /// "IMPOSTA DI BOLLO"
    #[serde(rename = "stamp-duty")]
    StampDuty,
    /// "COMMISSIONE ..." service charges
    #[serde(rename = "fee")]
    Fee,
    /// "PAGAMENTO POSTAMAT": debit card payment at a merchant
    #[serde(rename = "card-payment")]
    CardPayment,
    /// "PRELIEVO" / "VERSAMENTO" cash operations
    #[serde(rename = "atm-cash-operation")]
    AtmCashOperation,
    /// "ADDEBITO DIRETTO" (SEPA direct debit)
    #[serde(rename = "direct-debit")]
    DirectDebit,
    /// "ADDEBITO PREAUTORIZZATO"
    #[serde(rename = "preauthorized-debit")]
    PreauthorizedDebit,
    #[serde(rename = "generic-credit")]
    GenericCredit,
    #[serde(rename = "generic-debit")]
    GenericDebit,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 10] = [
        Category::Transfer,
        Category::InternalTransfer,
        Category::StampDuty,
        Category::Fee,
        Category::CardPayment,
        Category::AtmCashOperation,
        Category::DirectDebit,
        Category::PreauthorizedDebit,
        Category::GenericCredit,
        Category::GenericDebit,
    ];

    /// OFX transaction type emitted for this category
    pub fn trn_type(&self) -> TrnType {
        match self {
            Category::Transfer | Category::InternalTransfer => TrnType::Xfer,
            Category::StampDuty => TrnType::Fee,
            Category::Fee => TrnType::SrvChg,
            Category::CardPayment => TrnType::Payment,
            Category::AtmCashOperation => TrnType::Atm,
            Category::DirectDebit | Category::PreauthorizedDebit => TrnType::DirectDebit,
            Category::GenericCredit => TrnType::Credit,
            Category::GenericDebit => TrnType::Debit,
        }
    }

    /// Short kebab-case name, same as the serde representation
    pub fn name(&self) -> &'static str {
        match self {
            Category::Transfer => "transfer",
            Category::InternalTransfer => "internal-transfer",
            Category::StampDuty => "stamp-duty",
            Category::Fee => "fee",
            Category::CardPayment => "card-payment",
            Category::AtmCashOperation => "atm-cash-operation",
            Category::DirectDebit => "direct-debit",
            Category::PreauthorizedDebit => "preauthorized-debit",
            Category::GenericCredit => "generic-credit",
            Category::GenericDebit => "generic-debit",
        }
    }

    /// True for the sign-based fallback categories
    pub fn is_generic(&self) -> bool {
        matches!(self, Category::GenericCredit | Category::GenericDebit)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// OFX `TRNTYPE` vocabulary used by the converter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TrnType {
    #[serde(rename = "XFER")]
    Xfer,
    #[serde(rename = "FEE")]
    Fee,
    #[serde(rename = "SRVCHG")]
    SrvChg,
    #[serde(rename = "PAYMENT")]
    Payment,
    #[serde(rename = "ATM")]
    Atm,
    #[serde(rename = "DIRECTDEBIT")]
    DirectDebit,
    #[serde(rename = "CREDIT")]
    Credit,
    #[serde(rename = "DEBIT")]
    Debit,
}

impl TrnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrnType::Xfer => "XFER",
            TrnType::Fee => "FEE",
            TrnType::SrvChg => "SRVCHG",
            TrnType::Payment => "PAYMENT",
            TrnType::Atm => "ATM",
            TrnType::DirectDebit => "DIRECTDEBIT",
            TrnType::Credit => "CREDIT",
            TrnType::Debit => "DEBIT",
        }
    }
}

impl fmt::Display for TrnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table() {
        assert_eq!(Category::Transfer.trn_type(), TrnType::Xfer);
        assert_eq!(Category::InternalTransfer.trn_type(), TrnType::Xfer);
        assert_eq!(Category::StampDuty.trn_type(), TrnType::Fee);
        assert_eq!(Category::Fee.trn_type(), TrnType::SrvChg);
        assert_eq!(Category::CardPayment.trn_type(), TrnType::Payment);
        assert_eq!(Category::AtmCashOperation.trn_type(), TrnType::Atm);
        assert_eq!(Category::DirectDebit.trn_type(), TrnType::DirectDebit);
        assert_eq!(Category::PreauthorizedDebit.trn_type(), TrnType::DirectDebit);
        assert_eq!(Category::GenericCredit.trn_type(), TrnType::Credit);
        assert_eq!(Category::GenericDebit.trn_type(), TrnType::Debit);
    }

    #[test]
    fn test_name_matches_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.name()));
        }
    }

    #[test]
    fn test_trn_type_serializes_as_ofx_code() {
        let json = serde_json::to_string(&TrnType::SrvChg).unwrap();
        assert_eq!(json, "\"SRVCHG\"");
        assert_eq!(TrnType::DirectDebit.to_string(), "DIRECTDEBIT");
    }

    #[test]
    fn test_generic_categories() {
        let generic: Vec<_> = Category::ALL.iter().filter(|c| c.is_generic()).collect();
        assert_eq!(generic, vec![&Category::GenericCredit, &Category::GenericDebit]);
    }
}
