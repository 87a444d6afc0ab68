use crate::error::ExtractError;
use crate::extractor::record::CfdiRecord;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use roxmltree::{Document, Node};
use std::path::Path;
use std::str::FromStr;

/// Namespace URI of the SAT payroll complement, version 1.2.
pub const NOMINA12_NAMESPACE: &str = "http://www.sat.gob.mx/nomina12";

const NOMINA: &str = "nomina12:Nomina";
const PERCEPCIONES: &str = "nomina12:Percepciones";
const DEDUCCIONES: &str = "nomina12:Deducciones";

const MAX_INTEGER_DIGITS: usize = 18;
const MAX_FRACTION_DIGITS: usize = 6;

/// Reads and parses one CFDI file. See [`parse_document`].
pub fn parse_file(path: &Path) -> Result<Option<CfdiRecord>, ExtractError> {
    let content = std::fs::read_to_string(path)?;
    parse_document(&content)
}

/// Extracts the payroll totals from the text of one CFDI.
///
/// Returns `Ok(None)` when the document has no `nomina12:Nomina` element or
/// that element has no `TotalPercepciones`: it is not a payroll receipt.
/// Elements are matched by namespace URI, so a `Nomina` element from any other
/// schema is ignored.
pub fn parse_document(xml: &str) -> Result<Option<CfdiRecord>, ExtractError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let doc = Document::parse(xml)?;

    let Some(nomina) = doc.descendants().find(|n| is_nomina12(n, "Nomina")) else {
        return Ok(None);
    };
    let Some(total_percepciones) = nomina.attribute("TotalPercepciones") else {
        return Ok(None);
    };

    let total_percepciones = parse_decimal("TotalPercepciones", total_percepciones)?;
    let fecha_pago = parse_date(required_attribute(nomina, NOMINA, "FechaPago")?)?;

    let percepciones = exactly_one(nomina, "Percepciones", PERCEPCIONES)?;
    let deducciones = exactly_one(nomina, "Deducciones", DEDUCCIONES)?;

    Ok(Some(CfdiRecord {
        fecha_pago,
        total_percepciones,
        total_sueldo: decimal_attribute(percepciones, PERCEPCIONES, "TotalSueldos")?,
        total_exento: decimal_attribute(percepciones, PERCEPCIONES, "TotalExento")?,
        total_gravado: decimal_attribute(percepciones, PERCEPCIONES, "TotalGravado")?,
        total_impuestos_retenidos: decimal_attribute(
            deducciones,
            DEDUCCIONES,
            "TotalImpuestosRetenidos",
        )?,
    }))
}

fn is_nomina12(node: &Node, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace() == Some(NOMINA12_NAMESPACE)
}

fn exactly_one<'a, 'input>(
    scope: Node<'a, 'input>,
    local_name: &str,
    display_name: &'static str,
) -> Result<Node<'a, 'input>, ExtractError> {
    let mut found = scope.descendants().filter(|n| is_nomina12(n, local_name));

    let first = found.next().ok_or(ExtractError::MissingNode {
        node: display_name,
    })?;

    let extra = found.count();
    if extra > 0 {
        return Err(ExtractError::DuplicateNode {
            node: display_name,
            count: extra + 1,
        });
    }

    Ok(first)
}

fn required_attribute<'a>(
    node: Node<'a, '_>,
    node_name: &'static str,
    attribute: &'static str,
) -> Result<&'a str, ExtractError> {
    node.attribute(attribute)
        .ok_or(ExtractError::MissingAttribute {
            node: node_name,
            attribute,
        })
}

fn decimal_attribute(
    node: Node,
    node_name: &'static str,
    attribute: &'static str,
) -> Result<BigDecimal, ExtractError> {
    parse_decimal(attribute, required_attribute(node, node_name, attribute)?)
}

/// Parses an SAT `t_Importe` amount: up to 18 integer digits and an optional
/// fraction of up to 6 digits. Signs and exponents are rejected.
fn parse_decimal(attribute: &'static str, value: &str) -> Result<BigDecimal, ExtractError> {
    let invalid = || ExtractError::InvalidDecimal {
        attribute,
        value: value.to_string(),
    };

    let trimmed = value.trim();
    if !is_importe(trimmed) {
        return Err(invalid());
    }

    BigDecimal::from_str(trimmed).map_err(|_| invalid())
}

fn is_importe(value: &str) -> bool {
    let (integer, fraction) = match value.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (value, None),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    (1..=MAX_INTEGER_DIGITS).contains(&integer.len())
        && all_digits(integer)
        && fraction.map_or(true, |f| {
            (1..=MAX_FRACTION_DIGITS).contains(&f.len()) && all_digits(f)
        })
}

fn parse_date(value: &str) -> Result<NaiveDate, ExtractError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ExtractError::InvalidDate {
        value: value.to_string(),
    })
}
