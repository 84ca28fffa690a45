//! Fixed role catalog and the keyword bonus each role adds on top of the transform.

use std::sync::{Arc, OnceLock};

use serde::Serialize;

use super::features::text_contains;

/// Number of roles the transform scores.
pub const ROLE_COUNT: usize = 5;

const SKILL_MATCH_POINTS: f64 = 3.0;
const ENVIRONMENT_MATCH_POINTS: f64 = 5.0;

const STANDARD_ROLES: [(&str, &[&str], &[&str]); ROLE_COUNT] = [
    (
        "Atención a Clientes/Ventas",
        &[
            "Atender clientes",
            "Manejar caja",
            "Resolver quejas",
            "Tomar mensajes",
        ],
        &["interactuar", "adapto"],
    ),
    (
        "Asistente Administrativo",
        &["Organizar archivos", "Usar computadora", "Tomar mensajes"],
        &["tranquilo", "concentrado"],
    ),
    (
        "Operario de Producción",
        &[
            "Ayudar en preparación",
            "Empacar productos",
            "Limpiar y mantener",
        ],
        &["movimiento", "adapto"],
    ),
    (
        "Ayudante General",
        &[
            "Empacar productos",
            "Limpiar y mantener",
            "Organizar archivos",
            "Ayudar a compañeros",
        ],
        &["adapto", "movimiento"],
    ),
    (
        "Ayudante en cocina",
        &[
            "Ayudar en preparación",
            "Limpiar y mantener",
            "Empacar productos",
        ],
        &["movimiento", "concentrado"],
    ),
];

/// Stable catalog position, which is also the role's transform output slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RoleId(usize);

impl RoleId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Job role with the keywords that earn rule-based bonus points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleDefinition {
    #[serde(skip)]
    id: RoleId,
    pub name: String,
    pub skill_keywords: Vec<String>,
    pub environment_keywords: Vec<String>,
}

impl RoleDefinition {
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Count of selected skills containing any qualifying keyword.
    pub fn skill_matches(&self, practical_skills: &[String]) -> usize {
        practical_skills
            .iter()
            .filter(|skill| {
                self.skill_keywords
                    .iter()
                    .any(|keyword| text_contains(skill, keyword))
            })
            .count()
    }

    pub fn environment_matches(&self, environment: &str) -> bool {
        self.environment_keywords
            .iter()
            .any(|keyword| text_contains(environment, keyword))
    }

    /// Bonus points: 3 per matching skill, 5 for a matching environment.
    pub fn adjustment(&self, practical_skills: &[String], environment: &str) -> f64 {
        let skills = self.skill_matches(practical_skills) as f64 * SKILL_MATCH_POINTS;
        let environment = if self.environment_matches(environment) {
            ENVIRONMENT_MATCH_POINTS
        } else {
            0.0
        };
        skills + environment
    }
}

/// Ordered, immutable set of the roles candidates are scored against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RoleCatalog {
    roles: Vec<RoleDefinition>,
}

impl RoleCatalog {
    pub fn standard() -> Self {
        let roles = STANDARD_ROLES
            .iter()
            .enumerate()
            .map(|(index, (name, skills, environments))| RoleDefinition {
                id: RoleId(index),
                name: name.to_string(),
                skill_keywords: skills.iter().map(|keyword| keyword.to_string()).collect(),
                environment_keywords: environments
                    .iter()
                    .map(|keyword| keyword.to_string())
                    .collect(),
            })
            .collect();

        Self { roles }
    }

    /// Catalog shared by every scorer in the process.
    pub fn shared() -> Arc<RoleCatalog> {
        static SHARED: OnceLock<Arc<RoleCatalog>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Self::standard())).clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn get(&self, id: RoleId) -> &RoleDefinition {
        &self.roles[id.index()]
    }

    /// Lookup for request boundaries; scoring itself goes through [`RoleId`].
    pub fn find(&self, name: &str) -> Option<&RoleDefinition> {
        let name = name.trim();
        self.roles.iter().find(|role| role.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.roles.iter().map(|role| role.name.clone()).collect()
    }
}
