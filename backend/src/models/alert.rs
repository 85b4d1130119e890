//! Mining alerts (alertas de minería) and their lifecycle enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::{AlertId, UserId};
use crate::validation::{form::FormData, FormInput};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
    ToSchema,
)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
/// Risk levels in ascending order of severity.
pub enum RiskLevel {
    Bajo,
    Medio,
    Alto,
    #[serde(alias = "crítico")]
    Critico,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Bajo,
        RiskLevel::Medio,
        RiskLevel::Alto,
        RiskLevel::Critico,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Bajo => "bajo",
            RiskLevel::Medio => "medio",
            RiskLevel::Alto => "alto",
            RiskLevel::Critico => "critico",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Bajo => "Bajo",
            RiskLevel::Medio => "Medio",
            RiskLevel::Alto => "Alto",
            RiskLevel::Critico => "Crítico",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "bajo" => Some(RiskLevel::Bajo),
            "medio" => Some(RiskLevel::Medio),
            "alto" => Some(RiskLevel::Alto),
            "critico" | "crítico" => Some(RiskLevel::Critico),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Activa,
    #[serde(alias = "investigando")]
    EnProceso,
    Verificada,
    Resuelta,
    Falsa,
}

impl AlertStatus {
    pub const ALL: [AlertStatus; 5] = [
        AlertStatus::Activa,
        AlertStatus::EnProceso,
        AlertStatus::Verificada,
        AlertStatus::Resuelta,
        AlertStatus::Falsa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Activa => "activa",
            AlertStatus::EnProceso => "en_proceso",
            AlertStatus::Verificada => "verificada",
            AlertStatus::Resuelta => "resuelta",
            AlertStatus::Falsa => "falsa",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertStatus::Activa => "Activa",
            AlertStatus::EnProceso => "En proceso",
            AlertStatus::Verificada => "Verificada",
            AlertStatus::Resuelta => "Resuelta",
            AlertStatus::Falsa => "Falsa alarma",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "activa" => Some(AlertStatus::Activa),
            "en_proceso" | "investigando" => Some(AlertStatus::EnProceso),
            "verificada" => Some(AlertStatus::Verificada),
            "resuelta" => Some(AlertStatus::Resuelta),
            "falsa" => Some(AlertStatus::Falsa),
            _ => None,
        }
    }

    /// Closed statuses carry a resolution timestamp.
    pub fn is_closed(&self) -> bool {
        matches!(self, AlertStatus::Resuelta | AlertStatus::Falsa)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Alert {
    #[schema(value_type = String)]
    pub id: AlertId,
    pub location: String,
    pub activity: String,
    pub risk_level: RiskLevel,
    pub status: AlertStatus,
    #[schema(value_type = Option<String>)]
    pub assigned_user_id: Option<UserId>,
    pub notes: String,
    pub detected_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn new(location: String, activity: String, risk_level: RiskLevel, notes: String) -> Self {
        Self {
            id: AlertId::new(),
            location,
            activity,
            risk_level,
            status: AlertStatus::Activa,
            assigned_user_id: None,
            notes,
            detected_at: Utc::now(),
            resolved_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAlert {
    pub location: String,
    pub activity: String,
    pub risk_level: String,
    #[serde(default)]
    pub notes: String,
}

impl FormInput for CreateAlert {
    fn form_data(&self) -> FormData {
        FormData::from_pairs([
            ("location", self.location.as_str()),
            ("activity", self.activity.as_str()),
            ("risk_level", self.risk_level.as_str()),
            ("notes", self.notes.as_str()),
        ])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateAlertStatus {
    pub status: AlertStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct AlertListQuery {
    pub status: Option<String>,
}
