use crate::extractor::record::CfdiRecord;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Running sums over the payroll records of one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NominaTotals {
    documents: usize,
    total_percepciones: BigDecimal,
    total_sueldos: BigDecimal,
    total_exento: BigDecimal,
    total_gravado: BigDecimal,
    total_impuestos_retenidos: BigDecimal,
    period: Option<PaymentPeriod>,
}

/// Earliest and latest `FechaPago` seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPeriod {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

/// Final totals of a batch that contained at least one payroll record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub documents: usize,
    pub total_percepciones: BigDecimal,
    pub total_sueldos: BigDecimal,
    pub total_exento: BigDecimal,
    pub total_gravado: BigDecimal,
    pub total_impuestos_retenidos: BigDecimal,
    pub period: PaymentPeriod,
}

impl NominaTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: &CfdiRecord) {
        self.documents += 1;
        self.total_percepciones += &record.total_percepciones;
        self.total_sueldos += &record.total_sueldo;
        self.total_exento += &record.total_exento;
        self.total_gravado += &record.total_gravado;
        self.total_impuestos_retenidos += &record.total_impuestos_retenidos;

        let date = record.fecha_pago;
        self.period = Some(match self.period {
            None => PaymentPeriod {
                first: date,
                last: date,
            },
            Some(p) => PaymentPeriod {
                first: p.first.min(date),
                last: p.last.max(date),
            },
        });
    }

    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents == 0
    }

    /// `None` when no record was added, so an empty batch can never be
    /// mistaken for one whose amounts happen to sum to zero.
    pub fn finish(self) -> Option<AggregateSummary> {
        let period = self.period?;

        Some(AggregateSummary {
            documents: self.documents,
            total_percepciones: self.total_percepciones,
            total_sueldos: self.total_sueldos,
            total_exento: self.total_exento,
            total_gravado: self.total_gravado,
            total_impuestos_retenidos: self.total_impuestos_retenidos,
            period,
        })
    }
}

impl<'a> Extend<&'a CfdiRecord> for NominaTotals {
    fn extend<I: IntoIterator<Item = &'a CfdiRecord>>(&mut self, iter: I) {
        for record in iter {
            self.add(record);
        }
    }
}

impl FromIterator<CfdiRecord> for NominaTotals {
    fn from_iter<I: IntoIterator<Item = CfdiRecord>>(iter: I) -> Self {
        let mut totals = Self::new();
        for record in iter {
            totals.add(&record);
        }
        totals
    }
}

/// Folds extraction outcomes; absent records contribute nothing.
pub fn aggregate<I>(records: I) -> Option<AggregateSummary>
where
    I: IntoIterator<Item = Option<CfdiRecord>>,
{
    records.into_iter().flatten().collect::<NominaTotals>().finish()
}

impl AggregateSummary {
    /// Labeled amounts in report order.
    pub fn amounts(&self) -> [(&'static str, &BigDecimal); 5] {
        [
            ("Percepciones", &self.total_percepciones),
            ("Sueldos", &self.total_sueldos),
            ("Exento", &self.total_exento),
            ("Gravado", &self.total_gravado),
            ("Impuestos Retenidos", &self.total_impuestos_retenidos),
        ]
    }
}
