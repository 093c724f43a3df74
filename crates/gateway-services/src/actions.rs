// crates/gateway-services/src/actions.rs
// ============================================================================
// Module: SOAP Action Catalog
// Description: SOAPAction values and source labels per upstream operation.
// Purpose: Keep the wire-level operation names in one place.
// Dependencies: none
// ============================================================================

//! The upstream registries route by `SOAPAction`; these values are part of
//! the wire contract and must match the service WSDLs verbatim, trailing
//! slash included.

/// Source label for the person registry.
pub const SOURCE_SRP: &str = "SRP";
/// Source label for the id-document registry.
pub const SOURCE_RDO: &str = "RDO";
/// Source label for the dictionary service.
pub const SOURCE_CEP: &str = "CEP";

/// Person search.
pub const PESEL_WYSZUKAJ_OSOBY: &str =
    "http://msw.gov.pl/srp/v3_0/uslugi/pesel/Wyszukiwanie/wyszukajOsoby/";
/// Person data share by internal person id.
pub const PESEL_UDOSTEPNIJ_PO_ID: &str =
    "http://msw.gov.pl/srp/v3_0/uslugi/pesel/Udostepnianie/udostepnijAktualneDaneOsobyPoId/";
/// Person data share by PESEL.
pub const PESEL_UDOSTEPNIJ_PO_PESEL: &str =
    "http://msw.gov.pl/srp/v3_0/uslugi/pesel/Udostepnianie/udostepnijAktualneDaneOsobyPoPesel/";
/// Current photo share.
pub const RDO_UDOSTEPNIJ_AKTUALNE_ZDJECIE: &str =
    "http://msw.gov.pl/srp/v3_0/uslugi/dowody/Udostepnianie/udostepnijAktualneZdjecie/";
/// Current id-card data share for a PESEL list.
pub const RDO_UDOSTEPNIJ_DANE_DOWODOW_PO_PESEL: &str =
    "http://msw.gov.pl/srp/v3_0/uslugi/dowody/Udostepnianie/udostepnijDaneAktualnychDowodowPoPesel/";
/// Dictionary listing.
pub const CEP_POBIERZ_LISTE_SLOWNIKOW: &str =
    "http://cepik.gov.pl/slowniki/uslugi/udostepnianie/pobierzListeSlownikow/";
