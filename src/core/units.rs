//! UN/ECE Recommendation 20 unit codes used on SUNAT documents.
//!
//! SUNAT catalog 03 is a subset of Rec 20; the list below holds the codes
//! that show up on invoices and despatch advices in practice.

/// Check whether `code` is a known UN/ECE Rec 20 unit code.
pub fn is_known_unit_code(code: &str) -> bool {
    UNIT_CODES.binary_search(&code).is_ok()
}

/// Sorted for binary search.
static UNIT_CODES: &[&str] = &[
    "4A",  // Bobina
    "BE",  // Fardo
    "BG",  // Bolsa
    "BJ",  // Balde
    "BLL", // Barril
    "BO",  // Botella
    "BX",  // Caja
    "C62", // Piezas
    "CEN", // Ciento de unidades
    "CJ",  // Conos
    "CMK", // Centimetro cuadrado
    "CMQ", // Centimetro cubico
    "CMT", // Centimetro lineal
    "CT",  // Carton
    "CY",  // Cilindro
    "DAY", // Dia
    "DZN", // Docena
    "GLI", // Galon ingles
    "GLL", // Galon
    "GRM", // Gramo
    "HUR", // Hora
    "KGM", // Kilogramo
    "KT",  // Kit
    "KWH", // Kilovatio hora
    "LBR", // Libras
    "LTR", // Litro
    "MGM", // Miligramo
    "MIL", // Millares
    "MLT", // Mililitro
    "MMT", // Milimetro
    "MON", // Mes
    "MTK", // Metro cuadrado
    "MTQ", // Metro cubico
    "MTR", // Metro
    "NIU", // Unidad (bienes)
    "PK",  // Paquete
    "PR",  // Par
    "SET", // Juego
    "ST",  // Pliego
    "TNE", // Tonelada
    "TU",  // Tubos
    "ZZ",  // Unidad (servicios)
];
