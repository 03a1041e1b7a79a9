//! SUNAT catalog registry.
//!
//! Static lookup tables mapping domain codes to the list names, URIs and
//! agency identifiers that UBL code elements must carry. Everything here is
//! read-only and lives for the whole process.

use serde::{Deserialize, Serialize};

/// Agency name attached to every SUNAT-governed code.
pub const AGENCY_SUNAT: &str = "PE:SUNAT";
/// Agency for ubigeo (geolocation) codes.
pub const AGENCY_INEI: &str = "PE:INEI";
/// UN/ECE agency name for currency, country and unit lists.
pub const AGENCY_UNECE_LONG: &str = "United Nations Economic Commission for Europe";
/// List id for UN/ECE Recommendation 20 units.
pub const UNIT_CODE_LIST_ID: &str = "UN/ECE rec 20";
/// Unit code used for per-unit tax base measures.
pub const PER_UNIT_MEASURE_CODE: &str = "NIU";

const CATALOG_URI_PREFIX: &str = "urn:pe:gob:sunat:cpe:see:gem:catalogos:catalogo";

/// A SUNAT code catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Catalog {
    /// 01
    DocumentType,
    /// 05
    TaxType,
    /// 06
    IdentityDocument,
    /// 07
    IgvAffectation,
    /// 09
    CreditNoteType,
    /// 16
    PriceType,
    /// 18
    TransferMode,
    /// 20
    TransferReason,
    /// 51
    OperationType,
    /// 53
    AllowanceCharge,
    /// 55
    ItemProperty,
}

impl Catalog {
    pub const ALL: [Catalog; 11] = [
        Catalog::DocumentType,
        Catalog::TaxType,
        Catalog::IdentityDocument,
        Catalog::IgvAffectation,
        Catalog::CreditNoteType,
        Catalog::PriceType,
        Catalog::TransferMode,
        Catalog::TransferReason,
        Catalog::OperationType,
        Catalog::AllowanceCharge,
        Catalog::ItemProperty,
    ];

    /// Two-digit catalog number.
    pub fn number(self) -> &'static str {
        match self {
            Catalog::DocumentType => "01",
            Catalog::TaxType => "05",
            Catalog::IdentityDocument => "06",
            Catalog::IgvAffectation => "07",
            Catalog::CreditNoteType => "09",
            Catalog::PriceType => "16",
            Catalog::TransferMode => "18",
            Catalog::TransferReason => "20",
            Catalog::OperationType => "51",
            Catalog::AllowanceCharge => "53",
            Catalog::ItemProperty => "55",
        }
    }

    /// Catalog name as expected in `listName` / `schemeName`.
    pub fn name(self) -> &'static str {
        match self {
            Catalog::DocumentType => "Tipo de Documento",
            Catalog::TaxType => "Codigo de Tributos",
            Catalog::IdentityDocument => "Documento de Identidad",
            Catalog::IgvAffectation => "Afectacion de IGV",
            Catalog::CreditNoteType => "Tipo de nota de credito",
            Catalog::PriceType => "Tipo de Precio",
            Catalog::TransferMode => "Modalidad de traslado",
            Catalog::TransferReason => "Motivo de traslado",
            Catalog::OperationType => "Tipo de Operacion",
            Catalog::AllowanceCharge => "Cargo/descuento",
            Catalog::ItemProperty => "Propiedad del item",
        }
    }

    /// Catalog URI as expected in `listURI` / `schemeURI`.
    pub fn uri(self) -> String {
        format!("{CATALOG_URI_PREFIX}{}", self.number())
    }

    /// Look a catalog up by its two-digit number.
    pub fn from_number(number: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.number() == number)
    }
}

/// Tax schemes of catalog 05.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxScheme {
    /// Impuesto General a las Ventas.
    Igv,
    /// Impuesto a la Venta de Arroz Pilado.
    Ivap,
    /// Impuesto Selectivo al Consumo.
    Isc,
    /// Impuesto al Consumo de las Bolsas de Plastico.
    Icbper,
    Exportacion,
    Gratuito,
    Exonerado,
    Inafecto,
    Otros,
}

impl TaxScheme {
    pub fn id(&self) -> &'static str {
        match self {
            TaxScheme::Igv => "1000",
            TaxScheme::Ivap => "1016",
            TaxScheme::Isc => "2000",
            TaxScheme::Icbper => "7152",
            TaxScheme::Exportacion => "9995",
            TaxScheme::Gratuito => "9996",
            TaxScheme::Exonerado => "9997",
            TaxScheme::Inafecto => "9998",
            TaxScheme::Otros => "9999",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaxScheme::Igv => "IGV",
            TaxScheme::Ivap => "IVAP",
            TaxScheme::Isc => "ISC",
            TaxScheme::Icbper => "ICBPER",
            TaxScheme::Exportacion => "EXP",
            TaxScheme::Gratuito => "GRA",
            TaxScheme::Exonerado => "EXO",
            TaxScheme::Inafecto => "INA",
            TaxScheme::Otros => "OTROS",
        }
    }

    /// UN/ECE 5153 tax type code.
    pub fn type_code(&self) -> &'static str {
        match self {
            TaxScheme::Igv | TaxScheme::Ivap | TaxScheme::Exonerado => "VAT",
            TaxScheme::Isc => "EXC",
            TaxScheme::Icbper | TaxScheme::Otros => "OTH",
            TaxScheme::Exportacion | TaxScheme::Gratuito | TaxScheme::Inafecto => "FRE",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "1000" => Some(TaxScheme::Igv),
            "1016" => Some(TaxScheme::Ivap),
            "2000" => Some(TaxScheme::Isc),
            "7152" => Some(TaxScheme::Icbper),
            "9995" => Some(TaxScheme::Exportacion),
            "9996" => Some(TaxScheme::Gratuito),
            "9997" => Some(TaxScheme::Exonerado),
            "9998" => Some(TaxScheme::Inafecto),
            "9999" => Some(TaxScheme::Otros),
            _ => None,
        }
    }
}

/// Allowance/charge reason codes (catalog 53) that change the taxable base.
pub mod reason {
    /// Global discount affecting the taxable base.
    pub const BASE_DISCOUNT: &str = "02";
    /// Global charge affecting the taxable base.
    pub const BASE_CHARGE: &str = "49";

    /// Whether `code` lowers `LineExtensionAmount`.
    pub fn is_base_discount(code: &str) -> bool {
        code == BASE_DISCOUNT
    }

    /// Whether `code` raises `LineExtensionAmount`.
    pub fn is_base_charge(code: &str) -> bool {
        code == BASE_CHARGE
    }
}

/// Document type codes (catalog 01).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentTypeCode {
    /// 01 Factura
    Invoice,
    /// 03 Boleta de venta
    Receipt,
    /// 07 Nota de credito
    CreditNote,
    /// 08 Nota de debito
    DebitNote,
    /// 09 Guia de remision remitente
    DespatchAdvice,
}

impl DocumentTypeCode {
    pub fn code(&self) -> &'static str {
        match self {
            DocumentTypeCode::Invoice => "01",
            DocumentTypeCode::Receipt => "03",
            DocumentTypeCode::CreditNote => "07",
            DocumentTypeCode::DebitNote => "08",
            DocumentTypeCode::DespatchAdvice => "09",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(DocumentTypeCode::Invoice),
            "03" => Some(DocumentTypeCode::Receipt),
            "07" => Some(DocumentTypeCode::CreditNote),
            "08" => Some(DocumentTypeCode::DebitNote),
            "09" => Some(DocumentTypeCode::DespatchAdvice),
            _ => None,
        }
    }
}

/// Credit note type codes (catalog 09).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditNoteTypeCode {
    C01,
    C02,
    C03,
    C04,
    C05,
    C06,
    C07,
    C08,
    C09,
    C10,
    C11,
    C12,
    C13,
}

impl CreditNoteTypeCode {
    pub fn code(&self) -> &'static str {
        match self {
            CreditNoteTypeCode::C01 => "01",
            CreditNoteTypeCode::C02 => "02",
            CreditNoteTypeCode::C03 => "03",
            CreditNoteTypeCode::C04 => "04",
            CreditNoteTypeCode::C05 => "05",
            CreditNoteTypeCode::C06 => "06",
            CreditNoteTypeCode::C07 => "07",
            CreditNoteTypeCode::C08 => "08",
            CreditNoteTypeCode::C09 => "09",
            CreditNoteTypeCode::C10 => "10",
            CreditNoteTypeCode::C11 => "11",
            CreditNoteTypeCode::C12 => "12",
            CreditNoteTypeCode::C13 => "13",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CreditNoteTypeCode::C01 => "Anulacion de la operacion",
            CreditNoteTypeCode::C02 => "Anulacion por error en el RUC",
            CreditNoteTypeCode::C03 => "Correccion por error en la descripcion",
            CreditNoteTypeCode::C04 => "Descuento global",
            CreditNoteTypeCode::C05 => "Descuento por item",
            CreditNoteTypeCode::C06 => "Devolucion total",
            CreditNoteTypeCode::C07 => "Devolucion por item",
            CreditNoteTypeCode::C08 => "Bonificacion",
            CreditNoteTypeCode::C09 => "Disminucion en el valor",
            CreditNoteTypeCode::C10 => "Otros Conceptos",
            CreditNoteTypeCode::C11 => "Ajustes de operaciones de exportacion",
            CreditNoteTypeCode::C12 => "Ajustes afectos al IVAP",
            CreditNoteTypeCode::C13 => "Ajustes - montos y/o fechas de pago",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        use CreditNoteTypeCode::*;
        [C01, C02, C03, C04, C05, C06, C07, C08, C09, C10, C11, C12, C13]
            .into_iter()
            .find(|c| c.code() == code)
    }
}

/// Special-instruction indicators for despatch advices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryNoteInstruction {
    ScheduledTransshipment,
    MinorVehicle,
    ReturningWithEmptyContainers,
    ReturningEmpty,
    TotalTransferOfDeclaration,
    CarrierVehicleAndDrivers,
}

impl DeliveryNoteInstruction {
    pub fn indicator(&self) -> &'static str {
        match self {
            DeliveryNoteInstruction::ScheduledTransshipment => {
                "SUNAT_Envio_IndicadorTransbordoProgramado"
            }
            DeliveryNoteInstruction::MinorVehicle => "SUNAT_Envio_IndicadorTrasladoVehiculoM1L",
            DeliveryNoteInstruction::ReturningWithEmptyContainers => {
                "SUNAT_Envio_IndicadorRetornoVehiculoEnvaseVacio"
            }
            DeliveryNoteInstruction::ReturningEmpty => "SUNAT_Envio_IndicadorRetornoVehiculoVacio",
            DeliveryNoteInstruction::TotalTransferOfDeclaration => {
                "SUNAT_Envio_IndicadorTrasladoTotalDAMoDS"
            }
            DeliveryNoteInstruction::CarrierVehicleAndDrivers => {
                "SUNAT_Envio_IndicadorVehiculoConductoresTransp"
            }
        }
    }
}

/// Status of a line in a daily summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SummaryStatus {
    Add,
    Modify,
    Void,
}

impl SummaryStatus {
    pub fn code(&self) -> &'static str {
        match self {
            SummaryStatus::Add => "1",
            SummaryStatus::Modify => "2",
            SummaryStatus::Void => "3",
        }
    }
}
