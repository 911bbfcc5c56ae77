//! Wire types shared with the ImovLocal backend.
//!
//! Field names and enum wire values mirror the backend's API contract
//! exactly; everything here is `serde`-derived and carries no behavior
//! beyond small accessors. Records are read-only from this crate's
//! perspective — banners are admin-managed elsewhere, and property
//! submissions produce replacement records rather than mutating these.

use serde::{Deserialize, Serialize};

// =============================================================================
// BANNERS
// =============================================================================

/// Placement slot for a rotating banner set. One slot per page region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BannerPosition {
    #[serde(rename = "home_topo")]
    HomeTopo,
    #[serde(rename = "home_meio")]
    HomeMeio,
    #[serde(rename = "busca_topo")]
    BuscaTopo,
    #[serde(rename = "busca_lateral")]
    BuscaLateral,
    #[serde(rename = "imovel_lateral")]
    ImovelLateral,
    #[serde(rename = "rodape")]
    Rodape,
}

impl BannerPosition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HomeTopo => "home_topo",
            Self::HomeMeio => "home_meio",
            Self::BuscaTopo => "busca_topo",
            Self::BuscaLateral => "busca_lateral",
            Self::ImovelLateral => "imovel_lateral",
            Self::Rodape => "rodape",
        }
    }
}

/// Admin-managed advertising banner, read from `GET /banners/active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub image_url: String,
    /// Destination opened on click. Older records may carry an empty string;
    /// use [`Banner::click_target`] which normalizes both absences.
    #[serde(default)]
    pub link_url: Option<String>,
    pub position: BannerPosition,
}

impl Banner {
    /// Click destination, or `None` when click-through is disabled.
    #[must_use]
    pub fn click_target(&self) -> Option<&str> {
        match self.link_url.as_deref() {
            Some("") | None => None,
            Some(url) => Some(url),
        }
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

/// Listing purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purpose {
    #[serde(rename = "VENDA")]
    Sale,
    #[serde(rename = "ALUGUEL")]
    Rent,
    #[serde(rename = "ALUGUEL_TEMPORADA")]
    SeasonalRent,
}

impl Purpose {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "VENDA",
            Self::Rent => "ALUGUEL",
            Self::SeasonalRent => "ALUGUEL_TEMPORADA",
        }
    }
}

/// Closed set of property types recognized by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "Apartamento")]
    Apartamento,
    #[serde(rename = "Casa-Térrea")]
    CasaTerrea,
    #[serde(rename = "Casa-Térrea-Condomínio")]
    CasaTerreaCondominio,
    #[serde(rename = "Casa de Vila")]
    CasaDeVila,
    #[serde(rename = "Sobrado")]
    Sobrado,
    #[serde(rename = "Sobrado-Condomínio")]
    SobradoCondominio,
    #[serde(rename = "Kitnet")]
    Kitnet,
    #[serde(rename = "Studio")]
    Studio,
    #[serde(rename = "Apart Hotel / Flat / Loft")]
    Flat,
    #[serde(rename = "Apto. Cobertura / Duplex")]
    Cobertura,
    #[serde(rename = "Terreno")]
    Terreno,
    #[serde(rename = "Terreno-Condomínio")]
    TerrenoCondominio,
    #[serde(rename = "Imóvel Comercial")]
    Comercial,
    #[serde(rename = "Sala / Salão / Loja")]
    SalaLoja,
    #[serde(rename = "Galpão / Depósito")]
    Galpao,
    #[serde(rename = "Sítio / Fazenda / Chácara")]
    Sitio,
    #[serde(rename = "Espaço para Eventos")]
    EspacoEventos,
}

impl PropertyType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apartamento => "Apartamento",
            Self::CasaTerrea => "Casa-Térrea",
            Self::CasaTerreaCondominio => "Casa-Térrea-Condomínio",
            Self::CasaDeVila => "Casa de Vila",
            Self::Sobrado => "Sobrado",
            Self::SobradoCondominio => "Sobrado-Condomínio",
            Self::Kitnet => "Kitnet",
            Self::Studio => "Studio",
            Self::Flat => "Apart Hotel / Flat / Loft",
            Self::Cobertura => "Apto. Cobertura / Duplex",
            Self::Terreno => "Terreno",
            Self::TerrenoCondominio => "Terreno-Condomínio",
            Self::Comercial => "Imóvel Comercial",
            Self::SalaLoja => "Sala / Salão / Loja",
            Self::Galpao => "Galpão / Depósito",
            Self::Sitio => "Sítio / Fazenda / Chácara",
            Self::EspacoEventos => "Espaço para Eventos",
        }
    }
}

/// Full property record as returned by the backend (edit hydration and
/// create/update responses).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub purpose: Purpose,
    pub price: f64,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub garage: Option<u32>,
    #[serde(default)]
    pub year_built: Option<u32>,
    #[serde(default)]
    pub condominio: Option<f64>,
    #[serde(default)]
    pub iptu: Option<f64>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_launch: bool,
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// A locally selected image that has not been uploaded yet.
///
/// Carries the bytes so a failed submission can be retried without
/// re-selecting files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl StagedFile {
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), content_type: content_type.into(), bytes }
    }
}

/// Account limits from `GET /properties/my-limits`, consumed by the
/// image-staging ceiling check and the upgrade prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyLimits {
    pub can_create: bool,
    pub current_properties: u32,
    pub max_properties: u32,
    pub max_photos_per_property: u32,
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// ACCOUNTS
// =============================================================================

/// Account role of the logged-in user.
///
/// Gating here is a UX nicety only; the backend is the authority on what
/// each role may actually do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountRole {
    #[serde(rename = "particular")]
    Particular,
    #[serde(rename = "corretor")]
    Corretor,
    #[serde(rename = "imobiliaria")]
    Imobiliaria,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "admin_senior")]
    AdminSenior,
}

impl AccountRole {
    /// Purposes this role may advertise. Private individuals are limited to
    /// rentals; everyone else may also sell.
    #[must_use]
    pub const fn allowed_purposes(self) -> &'static [Purpose] {
        match self {
            Self::Particular => &[Purpose::Rent, Purpose::SeasonalRent],
            _ => &[Purpose::Sale, Purpose::Rent, Purpose::SeasonalRent],
        }
    }

    /// Default purpose preselected on a fresh create form.
    #[must_use]
    pub const fn default_purpose(self) -> Purpose {
        match self {
            Self::Particular => Purpose::Rent,
            _ => Purpose::Sale,
        }
    }

    /// Whether the launch-highlight flag is offered to this role.
    #[must_use]
    pub const fn can_mark_launch(self) -> bool {
        matches!(self, Self::Imobiliaria)
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
