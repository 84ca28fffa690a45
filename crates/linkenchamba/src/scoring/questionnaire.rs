use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Longest accepted free-text answer to the "what makes you unique" question.
pub const MAX_UNIQUE_TRAIT_CHARS: usize = 300;

/// Topics rated on the ordinal proficiency scale, in feature order.
pub const LEVEL_TOPICS: [&str; 4] = [
    "Productividad",
    "Organización",
    "Atención clientes",
    "Trabajo equipo",
];

pub const PRACTICAL_SKILL_OPTIONS: [&str; 10] = [
    "Atender clientes en mostrador o por teléfono",
    "Manejar caja registradora y dar cambio",
    "Organizar archivos o productos en inventario",
    "Usar computadora para escribir documentos básicos",
    "Empacar productos y preparar pedidos",
    "Limpiar y mantener áreas de trabajo ordenadas",
    "Ayudar en preparación de productos o materiales",
    "Tomar mensajes y recados con claridad",
    "Resolver quejas simples de clientes",
    "Ayudar a compañeros con sus tareas cuando es necesario",
];

pub const TOOL_OPTIONS: [&str; 7] = [
    "Computadora (Windows, Internet, email)",
    "Teléfono y sistemas de mensajería",
    "Caja registradora o punto de venta",
    "Herramientas básicas (martillo, destornillador, etc.)",
    "Equipo de cocina o restaurante",
    "Vehículo para entregas",
    "Ninguno de los anteriores, pero aprendo rápido",
];

pub const ENVIRONMENT_OPTIONS: [&str; 5] = [
    "Me gusta el movimiento y estar activo todo el día",
    "Prefiero trabajo tranquilo y organizado",
    "Disfruto interactuar con mucha gente",
    "Trabajo mejor concentrado en una sola tarea",
    "Me adapto fácilmente a cualquier ambiente",
];

pub const ACTIVITY_OPTIONS: [&str; 5] = [
    "Ayudar directamente a clientes o personas",
    "Crear o arreglar cosas con las manos",
    "Organizar y poner todo en orden",
    "Aprender cosas nuevas constantemente",
    "Resolver problemas prácticos inmediatos",
];

pub const KNOWLEDGE_OPTIONS: [&str; 6] = [
    "Matemáticas (hacer cuentas, medir, calcular precios)",
    "Lectura rápida y comprensión de instrucciones",
    "Escritura clara para llenar formatos o tomar notas",
    "Conceptos básicos de ventas o servicio al cliente",
    "Conocimiento de productos específicos (comida, ropa, materiales, etc.)",
    "Ninguna en particular, pero aprendo viendo y practicando",
];

pub const WORK_TYPE_OPTIONS: [&str; 5] = [
    "Trabajo de medio tiempo (4-6 horas diarias)",
    "Trabajo de tiempo completo (8 horas)",
    "Trabajo por proyectos o temporal",
    "Aprendizaje o capacitación con salario básico",
    "Cualquier opción mientras pueda aprender y crecer",
];

pub const ACHIEVEMENT_OPTIONS: [&str; 5] = [
    "Aprender un oficio o skill específico",
    "Tener un ingreso estable para mis gastos",
    "Ganar experiencia para mejor empleo después",
    "Desarrollarme dentro de esta empresa",
    "Descubrir en qué soy bueno profesionalmente",
];

pub const REACTION_OPTIONS: [&str; 5] = [
    "Pregunto a alguien con más experiencia",
    "Busco la solución yo mismo investigando",
    "Organizo la información para entender mejor",
    "Actúo inmediatamente con lo que sé",
    "Mantengo la calma y evalúo opciones",
];

pub const STANDS_OUT_OPTIONS: [&str; 6] = [
    "Cuando hay que ayudar a otros a entenderse",
    "Cuando hay que encontrar errores o detalles",
    "Cuando hay que aprender algo nuevo rápido",
    "Cuando hay que mantener el orden en el caos",
    "Cuando hay que motivar al equipo",
    "No estoy seguro, necesito oportunidad para descubrirlo",
];

pub const MOTIVATION_OPTIONS: [&str; 5] = [
    "Necesidad económica inmediata",
    "Aprender y desarrollar habilidades",
    "Estabilidad y crecimiento a largo plazo",
    "Ambiente de trabajo positivo",
    "Todas las anteriores",
];

/// Answers collected by the skills questionnaire.
///
/// Every field is optional on input; absent collections read as empty and absent
/// single-choice answers read as the empty string, which never matches a keyword.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionnaireResponse {
    #[serde(rename = "habilidades_practicas")]
    pub practical_skills: Vec<String>,
    #[serde(rename = "herramientas")]
    pub tools: Vec<String>,
    #[serde(rename = "ambiente")]
    pub environment: String,
    #[serde(rename = "actividades")]
    pub activities: Vec<String>,
    #[serde(rename = "conocimientos")]
    pub knowledge_areas: Vec<String>,
    #[serde(rename = "niveles")]
    pub levels: BTreeMap<String, ProficiencyLevel>,
    #[serde(rename = "tipo_trabajo")]
    pub work_type: String,
    #[serde(rename = "logros")]
    pub achievements: Vec<String>,
    #[serde(rename = "reaccion")]
    pub reaction: String,
    #[serde(rename = "destaca")]
    pub stands_out: Vec<String>,
    #[serde(rename = "motivacion")]
    pub motivation: String,
    #[serde(rename = "unico")]
    pub unique_trait: String,
}

impl QuestionnaireResponse {
    /// Level recorded for a topic, `None` when the topic was left unanswered.
    pub fn level(&self, topic: &str) -> ProficiencyLevel {
        self.levels.get(topic).copied().unwrap_or_default()
    }
}

/// Self-assessed familiarity with a topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProficiencyLevel {
    #[default]
    None,
    Basic,
    Intermediate,
    Advanced,
}

impl ProficiencyLevel {
    pub const ALL: [ProficiencyLevel; 4] = [
        ProficiencyLevel::None,
        ProficiencyLevel::Basic,
        ProficiencyLevel::Intermediate,
        ProficiencyLevel::Advanced,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ProficiencyLevel::None => "Nada",
            ProficiencyLevel::Basic => "Básico",
            ProficiencyLevel::Intermediate => "Intermedio",
            ProficiencyLevel::Advanced => "Avanzado",
        }
    }

    pub const fn ordinal(self) -> u8 {
        match self {
            ProficiencyLevel::None => 0,
            ProficiencyLevel::Basic => 1,
            ProficiencyLevel::Intermediate => 2,
            ProficiencyLevel::Advanced => 3,
        }
    }

    /// Unknown labels read as `None`.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|level| level.label() == label.trim())
            .unwrap_or_default()
    }
}

impl Serialize for ProficiencyLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ProficiencyLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LevelVisitor;

        impl<'de> Visitor<'de> for LevelVisitor {
            type Value = ProficiencyLevel;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a proficiency label such as \"Básico\"")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(ProficiencyLevel::from_label(value))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(ProficiencyLevel::None)
            }
        }

        deserializer.deserialize_any(LevelVisitor)
    }
}
