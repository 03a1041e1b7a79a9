//! Building blocks shared by the document writers.

use chrono::NaiveDate;

use super::NamespaceConfig;
use super::xml_utils::{XmlWriter, format_quantity};
use crate::core::catalogs::{AGENCY_INEI, AGENCY_SUNAT, AGENCY_UNECE_LONG, UNIT_CODE_LIST_ID};
use crate::core::*;

pub(crate) const UBL_VERSION: &str = "2.1";
pub(crate) const CUSTOMIZATION: &str = "2.0";
const DEFAULT_PRICE_TYPE: &str = "01";

pub(crate) fn date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Root start tag with all namespace declarations.
pub(crate) fn start_root(
    w: &mut XmlWriter,
    root: &str,
    namespaces: &NamespaceConfig,
) -> Result<(), DocumentError> {
    let attrs = namespaces.root_attributes();
    let attrs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    w.start_element_with_attrs(root, &attrs)?;
    Ok(())
}

/// The empty extension slot the signature is later placed into.
pub(crate) fn write_extensions(w: &mut XmlWriter) -> Result<(), DocumentError> {
    w.start_element("ext:UBLExtensions")?;
    w.start_element("ext:UBLExtension")?;
    w.empty_element("ext:ExtensionContent")?;
    w.end_element("ext:UBLExtension")?;
    w.end_element("ext:UBLExtensions")?;
    Ok(())
}

pub(crate) fn write_versions(
    w: &mut XmlWriter,
    ubl_version: &str,
    customization: &str,
) -> Result<(), DocumentError> {
    w.text_element("cbc:UBLVersionID", ubl_version)?;
    w.text_element_with_attrs(
        "cbc:CustomizationID",
        customization,
        &[("schemeAgencyName", AGENCY_SUNAT)],
    )?;
    Ok(())
}

/// A code element carrying the SUNAT list attributes of `catalog`.
pub(crate) fn catalog_code(
    w: &mut XmlWriter,
    name: &str,
    value: &str,
    catalog: Catalog,
) -> Result<(), DocumentError> {
    let uri = catalog.uri();
    w.text_element_with_attrs(
        name,
        value,
        &[
            ("listAgencyName", AGENCY_SUNAT),
            ("listName", catalog.name()),
            ("listURI", &uri),
        ],
    )?;
    Ok(())
}

pub(crate) fn write_currency_code(w: &mut XmlWriter, currency: &str) -> Result<(), DocumentError> {
    w.text_element_with_attrs(
        "cbc:DocumentCurrencyCode",
        currency,
        &[
            ("listID", "ISO 4217 Alpha"),
            ("listName", "Currency"),
            ("listAgencyName", AGENCY_UNECE_LONG),
        ],
    )?;
    Ok(())
}

/// Legend 1000 with the total in words.
pub(crate) fn write_amount_note(
    w: &mut XmlWriter,
    amount: rust_decimal::Decimal,
) -> Result<(), DocumentError> {
    let words = amount_in_words(amount)?;
    w.text_element_with_attrs("cbc:Note", &words, &[("languageLocaleID", AMOUNT_IN_WORDS_LEGEND)])?;
    Ok(())
}

/// Reference id of the `cac:Signature` block: explicit, or the supplier's document number.
pub(crate) fn signature_reference<'a>(explicit: Option<&'a str>, supplier: &'a Party) -> &'a str {
    explicit.unwrap_or(&supplier.doi)
}

/// `cac:Signature` pointing at the enveloped signature.
pub(crate) fn write_signature_placeholder(
    w: &mut XmlWriter,
    id: &str,
    supplier: &Party,
) -> Result<(), DocumentError> {
    w.start_element("cac:Signature")?;
    w.text_element("cbc:ID", id)?;
    w.start_element("cac:SignatoryParty")?;
    w.start_element("cac:PartyIdentification")?;
    w.text_element("cbc:ID", &supplier.doi)?;
    w.end_element("cac:PartyIdentification")?;
    w.start_element("cac:PartyName")?;
    w.text_element("cbc:Name", &supplier.name)?;
    w.end_element("cac:PartyName")?;
    w.end_element("cac:SignatoryParty")?;
    w.start_element("cac:DigitalSignatureAttachment")?;
    w.start_element("cac:ExternalReference")?;
    w.text_element("cbc:URI", id)?;
    w.end_element("cac:ExternalReference")?;
    w.end_element("cac:DigitalSignatureAttachment")?;
    w.end_element("cac:Signature")?;
    Ok(())
}

/// Which optional party blocks a role carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PartyRole {
    Supplier,
    Customer,
}

pub(crate) fn write_identity_id(
    w: &mut XmlWriter,
    doi_type: &str,
    doi: &str,
) -> Result<(), DocumentError> {
    let uri = Catalog::IdentityDocument.uri();
    w.text_element_with_attrs(
        "cbc:ID",
        doi,
        &[
            ("schemeID", doi_type),
            ("schemeName", Catalog::IdentityDocument.name()),
            ("schemeAgencyName", AGENCY_SUNAT),
            ("schemeURI", &uri),
        ],
    )?;
    Ok(())
}

/// `cac:AccountingSupplierParty`, `cac:DeliveryCustomerParty` and friends.
pub(crate) fn write_party(
    w: &mut XmlWriter,
    wrapper: &str,
    party: &Party,
    role: PartyRole,
) -> Result<(), DocumentError> {
    w.start_element(wrapper)?;
    w.start_element("cac:Party")?;

    w.start_element("cac:PartyIdentification")?;
    write_identity_id(w, &party.doi_type, &party.doi)?;
    w.end_element("cac:PartyIdentification")?;

    if role == PartyRole::Supplier {
        w.start_element("cac:PartyName")?;
        w.text_element("cbc:Name", &party.name)?;
        w.end_element("cac:PartyName")?;
    }

    w.start_element("cac:PartyLegalEntity")?;
    w.text_element("cbc:RegistrationName", &party.name)?;
    write_address(w, "cac:RegistrationAddress", &party.address)?;
    w.end_element("cac:PartyLegalEntity")?;

    w.end_element("cac:Party")?;
    w.end_element(wrapper)?;
    Ok(())
}

fn address_is_empty(address: &Address) -> bool {
    address.line.is_none() && address.country.is_none() && address.location.is_none()
}

/// An address element; nothing is written for an empty address.
pub(crate) fn write_address(
    w: &mut XmlWriter,
    name: &str,
    address: &Address,
) -> Result<(), DocumentError> {
    if address_is_empty(address) {
        return Ok(());
    }
    w.start_element(name)?;

    if let Some(location) = &address.location {
        if let Some(ubigeo) = &location.geo_location_id {
            w.text_element_with_attrs(
                "cbc:ID",
                ubigeo,
                &[("schemeAgencyName", AGENCY_INEI), ("schemeName", "Ubigeos")],
            )?;
        }
        if let Some(code) = &location.establishment_code {
            w.text_element_with_attrs(
                "cbc:AddressTypeCode",
                code,
                &[
                    ("listAgencyName", AGENCY_SUNAT),
                    ("listName", "Establecimientos anexos"),
                ],
            )?;
        }
        if let Some(street) = &location.street {
            w.text_element("cbc:StreetName", street)?;
        }
        if let Some(district) = &location.district {
            w.text_element("cbc:District", district)?;
        }
    }

    if let Some(line) = &address.line {
        w.start_element("cac:AddressLine")?;
        w.text_element("cbc:Line", line)?;
        w.end_element("cac:AddressLine")?;
    }
    if let Some(country) = &address.country {
        w.start_element("cac:Country")?;
        w.text_element_with_attrs(
            "cbc:IdentificationCode",
            country,
            &[
                ("listID", "ISO 3166-1"),
                ("listAgencyName", AGENCY_UNECE_LONG),
                ("listName", "Country"),
            ],
        )?;
        w.end_element("cac:Country")?;
    }

    w.end_element(name)?;
    Ok(())
}

/// `cac:PaymentTerms`: cash, or a credit total followed by one term per installment.
pub(crate) fn write_payment_terms(
    w: &mut XmlWriter,
    terms: Option<&PaymentTerms>,
) -> Result<(), DocumentError> {
    match terms {
        Some(terms) if terms.credit => {
            w.start_element("cac:PaymentTerms")?;
            w.text_element("cbc:ID", "FormaPago")?;
            w.text_element("cbc:PaymentMeansID", "Credito")?;
            w.amount_element("cbc:Amount", terms.total, &terms.currency)?;
            w.end_element("cac:PaymentTerms")?;

            for (i, inst) in terms.installments.iter().enumerate() {
                w.start_element("cac:PaymentTerms")?;
                w.text_element("cbc:ID", "FormaPago")?;
                w.text_element("cbc:PaymentMeansID", &format!("Cuota{:03}", i + 1))?;
                w.amount_element("cbc:Amount", inst.amount, &inst.currency)?;
                w.text_element("cbc:PaymentDueDate", &date(inst.due_date))?;
                w.end_element("cac:PaymentTerms")?;
            }
        }
        _ => {
            w.start_element("cac:PaymentTerms")?;
            w.text_element("cbc:ID", "FormaPago")?;
            w.text_element("cbc:PaymentMeansID", "Contado")?;
            w.end_element("cac:PaymentTerms")?;
        }
    }
    Ok(())
}

pub(crate) fn write_allowance_charge(
    w: &mut XmlWriter,
    ac: &AllowanceChargeEntry,
    currency: &str,
) -> Result<(), DocumentError> {
    w.start_element("cac:AllowanceCharge")?;
    w.text_element("cbc:ChargeIndicator", if ac.charge { "true" } else { "false" })?;
    catalog_code(w, "cbc:AllowanceChargeReasonCode", &ac.reason, Catalog::AllowanceCharge)?;
    w.text_element("cbc:MultiplierFactorNumeric", &format_quantity(ac.factor))?;
    w.amount_element("cbc:Amount", ac.amount, currency)?;
    w.amount_element("cbc:BaseAmount", ac.base_amount, currency)?;
    w.end_element("cac:AllowanceCharge")?;
    Ok(())
}

pub(crate) fn write_tax_total(
    w: &mut XmlWriter,
    total: &TaxTotal,
    currency: &str,
) -> Result<(), DocumentError> {
    w.start_element("cac:TaxTotal")?;
    w.amount_element("cbc:TaxAmount", total.tax_amount, currency)?;
    for sub in &total.subtotals {
        w.start_element("cac:TaxSubtotal")?;
        if let Some(taxable) = sub.taxable_amount {
            w.amount_element("cbc:TaxableAmount", taxable, currency)?;
        }
        w.amount_element("cbc:TaxAmount", sub.tax_amount, currency)?;
        if let Some(measure) = &sub.base_unit_measure {
            w.quantity_element("cbc:BaseUnitMeasure", measure.value, &measure.unit_code, &[])?;
        }
        write_tax_category(w, &sub.category, currency)?;
        w.end_element("cac:TaxSubtotal")?;
    }
    w.end_element("cac:TaxTotal")?;
    Ok(())
}

fn write_tax_category(
    w: &mut XmlWriter,
    category: &TaxCategory,
    currency: &str,
) -> Result<(), DocumentError> {
    w.start_element("cac:TaxCategory")?;
    if let Some(percent) = category.percent {
        w.text_element("cbc:Percent", &format_quantity(percent))?;
    }
    if let Some(per_unit) = category.per_unit_amount {
        w.amount_element("cbc:PerUnitAmount", per_unit, currency)?;
    }
    if let Some(reason) = &category.exemption_reason {
        catalog_code(w, "cbc:TaxExemptionReasonCode", reason, Catalog::IgvAffectation)?;
    }
    write_tax_scheme(w, category.scheme)?;
    w.end_element("cac:TaxCategory")?;
    Ok(())
}

pub(crate) fn write_tax_scheme(w: &mut XmlWriter, scheme: TaxScheme) -> Result<(), DocumentError> {
    let uri = Catalog::TaxType.uri();
    w.start_element("cac:TaxScheme")?;
    w.text_element_with_attrs(
        "cbc:ID",
        scheme.id(),
        &[
            ("schemeAgencyName", AGENCY_SUNAT),
            ("schemeName", Catalog::TaxType.name()),
            ("schemeURI", &uri),
        ],
    )?;
    w.text_element("cbc:Name", scheme.name())?;
    w.text_element("cbc:TaxTypeCode", scheme.type_code())?;
    w.end_element("cac:TaxScheme")?;
    Ok(())
}

pub(crate) fn write_monetary_total(
    w: &mut XmlWriter,
    name: &str,
    total: &MonetaryTotal,
    currency: &str,
) -> Result<(), DocumentError> {
    w.start_element(name)?;
    w.amount_element("cbc:LineExtensionAmount", total.line_extension, currency)?;
    w.amount_element("cbc:TaxExclusiveAmount", total.tax_exclusive, currency)?;
    w.amount_element("cbc:TaxInclusiveAmount", total.tax_inclusive, currency)?;
    if let Some(charges) = total.charge_total {
        w.amount_element("cbc:ChargeTotalAmount", charges, currency)?;
    }
    if let Some(rounding) = total.payable_rounding {
        w.amount_element("cbc:PayableRoundingAmount", rounding, currency)?;
    }
    w.amount_element("cbc:PayableAmount", total.payable, currency)?;
    w.end_element(name)?;
    Ok(())
}

/// Element names and ordering of invoice vs. credit note lines.
pub(crate) struct LineLayout {
    pub element: &'static str,
    pub quantity: &'static str,
    /// `InvoiceLine` places allowance/charges before `TaxTotal`, `CreditNoteLine` after.
    pub allowances_first: bool,
}

pub(crate) const INVOICE_LINE: LineLayout = LineLayout {
    element: "cac:InvoiceLine",
    quantity: "cbc:InvoicedQuantity",
    allowances_first: true,
};

pub(crate) const CREDIT_NOTE_LINE: LineLayout = LineLayout {
    element: "cac:CreditNoteLine",
    quantity: "cbc:CreditedQuantity",
    allowances_first: false,
};

pub(crate) const UNIT_LIST_ATTRS: [(&str, &str); 2] = [
    ("unitCodeListID", UNIT_CODE_LIST_ID),
    ("unitCodeListAgencyName", AGENCY_UNECE_LONG),
];

pub(crate) fn write_line(
    w: &mut XmlWriter,
    layout: &LineLayout,
    index: usize,
    line: &Line,
    totals: &LineTotals,
    currency: &str,
) -> Result<(), DocumentError> {
    w.start_element(layout.element)?;
    w.text_element("cbc:ID", &index.to_string())?;
    w.quantity_element(layout.quantity, line.quantity, &line.unit_code, &UNIT_LIST_ATTRS)?;
    w.amount_element("cbc:LineExtensionAmount", line.net_price, currency)?;

    w.start_element("cac:PricingReference")?;
    w.start_element("cac:AlternativeConditionPrice")?;
    w.amount_element("cbc:PriceAmount", totals.pricing_reference, currency)?;
    catalog_code(
        w,
        "cbc:PriceTypeCode",
        line.price_type.as_deref().unwrap_or(DEFAULT_PRICE_TYPE),
        Catalog::PriceType,
    )?;
    w.end_element("cac:AlternativeConditionPrice")?;
    w.end_element("cac:PricingReference")?;

    if layout.allowances_first {
        for ac in &line.allowances_charges {
            write_allowance_charge(w, ac, currency)?;
        }
        write_tax_total(w, &totals.tax_total, currency)?;
    } else {
        write_tax_total(w, &totals.tax_total, currency)?;
        for ac in &line.allowances_charges {
            write_allowance_charge(w, ac, currency)?;
        }
    }

    w.start_element("cac:Item")?;
    w.text_element("cbc:Description", &line.description)?;
    if !line.sku.is_empty() {
        w.start_element("cac:SellersItemIdentification")?;
        w.text_element("cbc:ID", &line.sku)?;
        w.end_element("cac:SellersItemIdentification")?;
    }
    for prop in &line.properties {
        w.start_element("cac:AdditionalItemProperty")?;
        w.text_element("cbc:Name", &prop.name)?;
        catalog_code(w, "cbc:NameCode", &prop.code, Catalog::ItemProperty)?;
        w.text_element("cbc:Value", &prop.value)?;
        w.end_element("cac:AdditionalItemProperty")?;
    }
    w.end_element("cac:Item")?;

    w.start_element("cac:Price")?;
    w.amount_element("cbc:PriceAmount", line.net_unit_price, currency)?;
    w.end_element("cac:Price")?;

    w.end_element(layout.element)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn render(f: impl FnOnce(&mut XmlWriter) -> Result<(), DocumentError>) -> String {
        let mut w = XmlWriter::fragment(false);
        f(&mut w).unwrap();
        w.into_string().unwrap()
    }

    #[test]
    fn cash_payment_terms() {
        let xml = render(|w| write_payment_terms(w, None));
        assert_eq!(
            xml,
            "<cac:PaymentTerms><cbc:ID>FormaPago</cbc:ID><cbc:PaymentMeansID>Contado</cbc:PaymentMeansID></cac:PaymentTerms>"
        );
    }

    #[test]
    fn credit_installments_are_numbered() {
        let due = NaiveDate::from_ymd_opt(2020, 9, 16).unwrap();
        let terms = PaymentTerms::credit(
            dec!(118),
            "PEN",
            vec![
                Installment { amount: dec!(59), currency: "PEN".into(), due_date: due },
                Installment { amount: dec!(59), currency: "PEN".into(), due_date: due },
            ],
        );
        let xml = render(|w| write_payment_terms(w, Some(&terms)));
        assert!(xml.contains("<cbc:PaymentMeansID>Credito</cbc:PaymentMeansID><cbc:Amount currencyID=\"PEN\">118.00</cbc:Amount>"));
        assert!(xml.contains("<cbc:PaymentMeansID>Cuota001</cbc:PaymentMeansID>"));
        assert!(xml.contains("<cbc:PaymentMeansID>Cuota002</cbc:PaymentMeansID>"));
        assert!(xml.contains("<cbc:PaymentDueDate>2020-09-16</cbc:PaymentDueDate>"));
    }

    #[test]
    fn customer_address_has_no_location_fields() {
        let address = Address {
            line: Some("Av. Siempre Viva 742".into()),
            country: Some("PE".into()),
            location: None,
        };
        let xml = render(|w| write_address(w, "cac:RegistrationAddress", &address));
        assert!(!xml.contains("Ubigeos"));
        assert!(xml.contains("<cbc:Line>Av. Siempre Viva 742</cbc:Line>"));
        assert!(xml.contains(">PE</cbc:IdentificationCode>"));
    }

    #[test]
    fn empty_address_is_skipped() {
        assert_eq!(render(|w| write_address(w, "cac:RegistrationAddress", &Address::default())), "");
    }

    #[test]
    fn allowance_charge_block() {
        let ac = AllowanceChargeEntry::allowance("02", dec!(0.10), dec!(10.005), dec!(100));
        let xml = render(|w| write_allowance_charge(w, &ac, "PEN"));
        assert!(xml.starts_with("<cac:AllowanceCharge><cbc:ChargeIndicator>false</cbc:ChargeIndicator>"));
        assert!(xml.contains("listURI=\"urn:pe:gob:sunat:cpe:see:gem:catalogos:catalogo53\">02<"));
        assert!(xml.contains("<cbc:MultiplierFactorNumeric>0.10</cbc:MultiplierFactorNumeric>"));
        assert!(xml.contains("<cbc:Amount currencyID=\"PEN\">10.01</cbc:Amount>"));
    }
}
