//! Prompt construction for flight insights
//!
//! Turns the active flight records into a `(system, user)` prompt pair. Each
//! flight is joined with its airline and airports and rendered as one line of
//! text; the prompt kind picks the instruction placed before that listing.

use std::collections::HashMap;

use crate::records::{Airline, Airport, Flight};

/// Literal used when a flight references a record that is missing or inactive
pub const MISSING_REFERENCE: &str = "N/A";

/// Which endpoint the prompt is for. Selects the system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptFamily {
    Summary,
    Alerts,
}

impl PromptFamily {
    pub fn system_prompt(self) -> &'static str {
        match self {
            PromptFamily::Summary => {
                "Eres un asistente útil especializado en información de vuelos. Tu tarea es \
                 resumir datos de vuelos de manera concisa y clara. Responde siempre en español."
            }
            PromptFamily::Alerts => {
                "Eres un asistente útil especializado en la detección y reporte de alertas sobre \
                 vuelos. Analiza los datos proporcionados y genera alertas claras y concisas. \
                 Responde siempre en español."
            }
        }
    }

    /// What the endpoint generates, used in error messages
    pub fn action(self) -> &'static str {
        match self {
            PromptFamily::Summary => "el resumen de vuelos",
            PromptFamily::Alerts => "alertas de vuelos",
        }
    }

    /// Short label for logs and metrics
    pub fn label(self) -> &'static str {
        match self {
            PromptFamily::Summary => "summary",
            PromptFamily::Alerts => "alerts",
        }
    }
}

/// Instruction template selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptKind {
    #[default]
    GeneralSummary,
    PopularDestinations,
    DelaysCancellations,
    HighOccupancy,
    CriticalAlerts,
    ManagementSuggestions,
}

impl PromptKind {
    pub const ALL: [PromptKind; 6] = [
        PromptKind::GeneralSummary,
        PromptKind::PopularDestinations,
        PromptKind::DelaysCancellations,
        PromptKind::HighOccupancy,
        PromptKind::CriticalAlerts,
        PromptKind::ManagementSuggestions,
    ];

    /// Wire key as sent by the panel in `promptType`
    pub fn key(self) -> &'static str {
        match self {
            PromptKind::GeneralSummary => "resumen_general",
            PromptKind::PopularDestinations => "destinos_populares",
            PromptKind::DelaysCancellations => "retrasos_cancelaciones",
            PromptKind::HighOccupancy => "alta_ocupacion",
            PromptKind::CriticalAlerts => "alertas_criticas",
            PromptKind::ManagementSuggestions => "sugerencias",
        }
    }

    /// Resolve a wire key. Unknown keys resolve to the general summary so the
    /// endpoint always has something to ask for.
    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == key)
            .unwrap_or_default()
    }

    fn instruction(self) -> &'static str {
        match self {
            PromptKind::GeneralSummary => {
                "Genera un resumen general de los siguientes vuelos. Destaca fechas, destinos \
                 populares y aerolíneas principales, así como cualquier estado notable \
                 (retrasos, etc.):\n\n"
            }
            PromptKind::PopularDestinations => {
                "Analiza los siguientes vuelos y genera una lista de los destinos más populares \
                 y la cantidad de vuelos a cada uno:\n\n"
            }
            PromptKind::DelaysCancellations => {
                "Identifica y lista los vuelos que están con estado 'retrasado' o 'cancelado'. \
                 Para cada uno, proporciona el ID de vuelo, la aerolínea y el destino:\n\n"
            }
            PromptKind::HighOccupancy => {
                "Genera una lista de los vuelos que podrían tener una alta ocupación. Basándote \
                 en la lista de vuelos, indica cuáles serían más populares por destino y \
                 aerolínea. Sé un poco creativo. Los vuelos son:\n\n"
            }
            PromptKind::CriticalAlerts => {
                "Actúa como un gestor de operaciones de aeropuerto. Analiza la siguiente lista \
                 de vuelos y genera alertas críticas y recomendaciones para la gestión. \
                 Considera posibles retrasos, congestión de puertas, falta de personal, o \
                 cualquier otro problema que puedas inferir. Presenta las alertas de forma clara \
                 y directa.\n\nLista de vuelos:\n"
            }
            PromptKind::ManagementSuggestions => {
                "Analiza la siguiente lista de vuelos y proporciona sugerencias para mejorar la \
                 eficiencia y la experiencia del pasajero. Ten en cuenta los horarios, destinos y \
                 aerolíneas para dar consejos prácticos. Los vuelos son:\n\n"
            }
        }
    }
}

/// System and user prompt pair sent upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Build the prompt pair for a family and a `promptType` key
pub fn build(
    family: PromptFamily,
    kind_key: &str,
    flights: &[Flight],
    airlines: &[Airline],
    airports: &[Airport],
) -> Prompt {
    let kind = PromptKind::from_key(kind_key);
    let listing = flight_listing(flights, airlines, airports);

    Prompt {
        system: family.system_prompt().to_string(),
        user: format!("{}{}", kind.instruction(), listing),
    }
}

/// Render one line per flight, in input order
pub fn flight_listing(flights: &[Flight], airlines: &[Airline], airports: &[Airport]) -> String {
    let airline_names: HashMap<i64, &str> =
        airlines.iter().map(|a| (a.id, a.name.as_str())).collect();
    let iata_codes: HashMap<i64, &str> =
        airports.iter().map(|a| (a.id, a.iata_code.as_str())).collect();

    let lookup = |table: &HashMap<i64, &str>, id: i64| -> String {
        table.get(&id).copied().unwrap_or(MISSING_REFERENCE).to_string()
    };

    flights
        .iter()
        .map(|flight| {
            format!(
                "Vuelo ID: {}, Aerolínea: {}, Origen: {}, Destino: {}, Fecha: {}, Hora Salida: {}, Estado: {}",
                flight.id,
                lookup(&airline_names, flight.airline_id),
                lookup(&iata_codes, flight.origin_airport_id),
                lookup(&iata_codes, flight.destination_airport_id),
                flight.departure_date.format("%Y-%m-%d"),
                flight.departure_time.format("%H:%M"),
                flight.status,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
