use tracing::debug;

use super::common::*;
use super::xml_utils::{XmlResult, XmlWriter};
use super::{AssemblyOptions, DocumentKind};
use crate::core::catalogs::AGENCY_SUNAT;
use crate::core::*;

/// Assemble an unsigned UBL 2.1 `DespatchAdvice` (guia de remision).
pub fn to_despatch_xml(advice: &DespatchAdvice, options: &AssemblyOptions) -> XmlResult {
    findings_to_result(validate_despatch(advice))?;
    debug!(number = %advice.number, lines = advice.lines.len(), "assembling despatch advice");

    let root = DocumentKind::DespatchAdvice.root_element();
    let mut w = XmlWriter::document(options.pretty)?;
    start_root(&mut w, root, &options.namespaces)?;

    write_extensions(&mut w)?;
    write_versions(&mut w, UBL_VERSION, CUSTOMIZATION)?;
    w.text_element("cbc:ID", &advice.number)?;
    w.text_element("cbc:IssueDate", &date(advice.issue_date))?;
    w.text_element("cbc:IssueTime", &advice.issue_time.format("%H:%M:%S").to_string())?;
    catalog_code(
        &mut w,
        "cbc:DespatchAdviceTypeCode",
        DocumentTypeCode::DespatchAdvice.code(),
        Catalog::DocumentType,
    )?;
    for note in &advice.notes {
        w.text_element("cbc:Note", note)?;
    }

    let signature_id = signature_reference(advice.signature_id.as_deref(), &advice.supplier);
    write_signature_placeholder(&mut w, signature_id, &advice.supplier)?;
    write_party(&mut w, "cac:DespatchSupplierParty", &advice.supplier, PartyRole::Supplier)?;
    write_party(&mut w, "cac:DeliveryCustomerParty", &advice.customer, PartyRole::Customer)?;

    write_shipment(&mut w, &advice.shipment)?;

    for (i, line) in advice.lines.iter().enumerate() {
        let id = (i + 1).to_string();
        w.start_element("cac:DespatchLine")?;
        w.text_element("cbc:ID", &id)?;
        w.quantity_element("cbc:DeliveredQuantity", line.quantity, &line.unit_code, &UNIT_LIST_ATTRS)?;
        w.start_element("cac:OrderLineReference")?;
        w.text_element("cbc:LineID", &id)?;
        w.end_element("cac:OrderLineReference")?;
        w.start_element("cac:Item")?;
        w.text_element("cbc:Description", &line.description)?;
        if !line.sku.is_empty() {
            w.start_element("cac:SellersItemIdentification")?;
            w.text_element("cbc:ID", &line.sku)?;
            w.end_element("cac:SellersItemIdentification")?;
        }
        w.end_element("cac:Item")?;
        w.end_element("cac:DespatchLine")?;
    }

    w.end_element(root)?;
    w.into_string()
}

fn write_shipment(w: &mut XmlWriter, shipment: &Shipment) -> Result<(), DocumentError> {
    w.start_element("cac:Shipment")?;
    w.text_element("cbc:ID", "1")?;
    if let Some(code) = &shipment.handling_code {
        catalog_code(w, "cbc:HandlingCode", code, Catalog::TransferReason)?;
    }
    if let Some(text) = &shipment.handling_instructions {
        w.text_element("cbc:HandlingInstructions", text)?;
    }
    if let Some(weight) = &shipment.gross_weight {
        w.quantity_element("cbc:GrossWeightMeasure", weight.value, &weight.unit_code, &[])?;
    }
    for instruction in &shipment.instructions {
        w.text_element("cbc:SpecialInstructions", instruction.indicator())?;
    }

    for stage in &shipment.stages {
        write_stage(w, stage)?;
    }

    let delivery = &shipment.delivery;
    w.start_element("cac:Delivery")?;
    write_address(w, "cac:DeliveryAddress", &delivery.delivery_address)?;
    w.start_element("cac:Despatch")?;
    write_address(w, "cac:DespatchAddress", &delivery.despatch_address)?;
    w.end_element("cac:Despatch")?;
    w.end_element("cac:Delivery")?;

    for unit in &shipment.transport_units {
        w.start_element("cac:TransportHandlingUnit")?;
        for equipment in &unit.equipments {
            w.start_element("cac:TransportEquipment")?;
            w.text_element("cbc:ID", &equipment.normalized_plate())?;
            if let Some(certificate) = equipment.normalized_certificate() {
                w.start_element("cac:ApplicableTransportMeans")?;
                w.text_element("cbc:RegistrationNationalityID", &certificate)?;
                w.end_element("cac:ApplicableTransportMeans")?;
            }
            w.end_element("cac:TransportEquipment")?;
        }
        w.end_element("cac:TransportHandlingUnit")?;
    }

    w.end_element("cac:Shipment")?;
    Ok(())
}

fn write_stage(w: &mut XmlWriter, stage: &Stage) -> Result<(), DocumentError> {
    w.start_element("cac:ShipmentStage")?;
    catalog_code(w, "cbc:TransportModeCode", &stage.mode, Catalog::TransferMode)?;
    w.start_element("cac:TransitPeriod")?;
    w.text_element("cbc:StartDate", &date(stage.start_date))?;
    w.end_element("cac:TransitPeriod")?;

    if let Some(carrier) = &stage.carrier {
        w.start_element("cac:CarrierParty")?;
        w.start_element("cac:PartyIdentification")?;
        write_identity_id(w, &carrier.party.doi_type, &carrier.party.doi)?;
        w.end_element("cac:PartyIdentification")?;
        w.start_element("cac:PartyLegalEntity")?;
        w.text_element("cbc:RegistrationName", &carrier.party.name)?;
        if let Some(company_id) = &carrier.company_id {
            w.text_element("cbc:CompanyID", company_id)?;
        }
        w.end_element("cac:PartyLegalEntity")?;
        w.end_element("cac:CarrierParty")?;
    }

    if let Some(driver) = &stage.driver {
        w.start_element("cac:DriverPerson")?;
        write_identity_id(w, &driver.doi_type, &driver.doi)?;
        w.text_element("cbc:FirstName", &driver.first_name)?;
        w.text_element("cbc:FamilyName", &driver.family_name)?;
        w.text_element("cbc:JobTitle", &driver.job_title)?;
        w.start_element("cac:IdentityDocumentReference")?;
        w.text_element_with_attrs("cbc:ID", &driver.license, &[("schemeAgencyName", AGENCY_SUNAT)])?;
        w.end_element("cac:IdentityDocumentReference")?;
        w.end_element("cac:DriverPerson")?;
    }

    w.end_element("cac:ShipmentStage")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    fn sample() -> DespatchAdvice {
        let start = NaiveDate::from_ymd_opt(2021, 3, 2).unwrap();
        let shipment = Shipment {
            handling_code: Some("01".into()),
            handling_instructions: Some("Venta".into()),
            gross_weight: Some(Measure { value: dec!(12.5), unit_code: "KGM".into() }),
            instructions: vec![DeliveryNoteInstruction::MinorVehicle],
            stages: vec![Stage {
                mode: "02".into(),
                start_date: start,
                carrier: None,
                driver: Some(Driver {
                    doi_type: "1".into(),
                    doi: "12345678".into(),
                    first_name: "Juan".into(),
                    family_name: "Perez".into(),
                    license: "Q12345678".into(),
                    job_title: "Principal".into(),
                }),
            }],
            delivery: Delivery {
                delivery_address: Address {
                    line: Some("Jr. Lima 100".into()),
                    country: None,
                    location: Some(EstablishmentLocation {
                        geo_location_id: Some("150101".into()),
                        ..Default::default()
                    }),
                },
                despatch_address: Address {
                    line: Some("Av. Industrial 5".into()),
                    country: None,
                    location: Some(EstablishmentLocation {
                        geo_location_id: Some("150102".into()),
                        ..Default::default()
                    }),
                },
            },
            transport_units: vec![TransportUnit {
                equipments: vec![Equipment {
                    license_plate: "abc-123".into(),
                    certificate: Some("mtc 001".into()),
                }],
            }],
        };
        DespatchAdviceBuilder::new("T001-1", start, NaiveTime::from_hms_opt(9, 5, 0).unwrap())
            .supplier(PartyBuilder::new("6", "20123456789", "ACME S.A.C.").build())
            .customer(PartyBuilder::new("6", "20987654321", "Cliente S.A.").build())
            .line("Cajas", "C-1", dec!(10), "NIU")
            .shipment(shipment)
            .build()
            .unwrap()
    }

    fn render(advice: &DespatchAdvice) -> String {
        to_despatch_xml(advice, &AssemblyOptions::for_kind(DocumentKind::DespatchAdvice).compact()).unwrap()
    }

    #[test]
    fn header_and_shipment() {
        let xml = render(&sample());
        assert!(xml.contains("<cbc:IssueTime>09:05:00</cbc:IssueTime>"));
        assert!(xml.contains("catalogo01\">09</cbc:DespatchAdviceTypeCode>"));
        assert!(xml.contains("<cbc:GrossWeightMeasure unitCode=\"KGM\">12.5</cbc:GrossWeightMeasure>"));
        assert!(xml.contains("<cbc:SpecialInstructions>SUNAT_Envio_IndicadorTrasladoVehiculoM1L</cbc:SpecialInstructions>"));
        assert!(xml.contains("<cbc:StartDate>2021-03-02</cbc:StartDate>"));
        assert!(xml.contains("<cbc:FirstName>Juan</cbc:FirstName>"));
        assert!(xml.contains("<cbc:ID>ABC123</cbc:ID>"));
        assert!(xml.contains("<cbc:RegistrationNationalityID>MTC001</cbc:RegistrationNationalityID>"));
    }

    #[test]
    fn delivery_precedes_despatch_address() {
        let xml = render(&sample());
        assert!(xml.find("150101").unwrap() < xml.find("150102").unwrap());
        assert!(xml.contains("<cac:DespatchLine><cbc:ID>1</cbc:ID>"));
        assert!(xml.contains("<cac:OrderLineReference><cbc:LineID>1</cbc:LineID></cac:OrderLineReference>"));
    }

    #[test]
    fn non_positive_weight_is_rejected() {
        let mut advice = sample();
        advice.shipment.gross_weight = Some(Measure { value: dec!(0), unit_code: "KGM".into() });
        let err = to_despatch_xml(&advice, &AssemblyOptions::for_kind(DocumentKind::DespatchAdvice)).unwrap_err();
        assert!(matches!(err, DocumentError::Validation(_)));
    }
}
