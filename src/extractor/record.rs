use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Payroll totals read from one CFDI carrying a Nomina 1.2 complement.
///
/// Every field is required; a document that cannot supply all six never
/// produces a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfdiRecord {
    pub fecha_pago: NaiveDate,
    pub total_percepciones: BigDecimal,
    pub total_sueldo: BigDecimal,
    pub total_exento: BigDecimal,
    pub total_gravado: BigDecimal,
    pub total_impuestos_retenidos: BigDecimal,
}
