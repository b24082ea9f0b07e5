//! Prompt construction for the dispatch relay
//!
//! Renders the fleet snapshot into Italian prose sections and wraps them,
//! together with the user's query, in a fixed answer template. Output is a
//! pure function of the input: identical requests give byte-identical prompts.

use crate::core::locale::{format_date_it, format_number_it};
use crate::models::{Driver, FleetContext, Trip, Vehicle};

/// Daily driving limit quoted to the model (EC 561/2006)
pub const DAILY_DRIVING_LIMIT_HOURS: u32 = 9;
/// Weekly driving limit quoted to the model (EC 561/2006)
pub const WEEKLY_DRIVING_LIMIT_HOURS: u32 = 56;

const SYSTEM_PROMPT: &str = "\
Sei un esperto di logistica e ottimizzazione dei trasporti per aziende italiane. Conosci perfettamente:
- Il Regolamento CE 561/2006 sui tempi di guida e riposo
- La normativa ADR per il trasporto di merci pericolose
- La Convenzione CMR per i trasporti internazionali
- Le best practice per l'ottimizzazione delle rotte e la riduzione dei costi
- La gestione delle flotte di trasporto su strada in Italia

Rispondi SEMPRE in italiano, in modo chiaro, professionale e strutturato. Usa le emoji per rendere più leggibile la risposta.
Fornisci raccomandazioni concrete, specifiche e motivate, citando i dati reali degli autisti e veicoli forniti.";

const ANSWER_TEMPLATE: &str = "\
Rispondi con:
1. **📊 Analisi della situazione attuale** — punti critici, opportunità, vincoli normativi rilevanti
2. **🎯 Raccomandazioni specifiche** — assegnazioni autista/veicolo/viaggio con motivazioni tecniche
3. **⚠️ Avvisi e vincoli** — scadenze imminenti, limiti ore di guida, requisiti ADR/internazionale
4. **💡 Ottimizzazioni aggiuntive** — suggerimenti per ridurre costi, aumentare efficienza
5. **📈 Score di ottimizzazione stimato** — percentuale da 0 a 100% rispetto al massimo teorico";

const NOT_ASSIGNED: &str = "❌ Non assegnato";

/// System instruction plus user prompt, ready to send upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the full prompt pair for a query against a fleet snapshot
    pub fn build(&self, user_query: &str, context: &FleetContext) -> Prompt {
        Prompt {
            system: SYSTEM_PROMPT.to_string(),
            user: self.user_prompt(user_query, context),
        }
    }

    fn user_prompt(&self, user_query: &str, context: &FleetContext) -> String {
        format!(
            "## SITUAZIONE ATTUALE DELLA FLOTTA\n\n\
             ### AUTISTI ({} totali)\n{}\n\n\
             ### VEICOLI ({} totali)\n{}\n\n\
             ### VIAGGI ({} totali)\n{}\n\n\
             ---\n\n\
             ## RICHIESTA DI OTTIMIZZAZIONE\n\n\
             {}\n\n\
             ---\n\n\
             {}",
            context.drivers.len(),
            render_drivers(&context.drivers),
            context.vehicles.len(),
            render_vehicles(&context.vehicles),
            context.trips.len(),
            render_trips(&context.trips),
            user_query,
            ANSWER_TEMPLATE,
        )
    }
}

/// Render the driver section; empty input gives an empty string
pub fn render_drivers(drivers: &[Driver]) -> String {
    join_entries(drivers.iter().map(render_driver))
}

pub fn render_vehicles(vehicles: &[Vehicle]) -> String {
    join_entries(vehicles.iter().map(render_vehicle))
}

pub fn render_trips(trips: &[Trip]) -> String {
    join_entries(trips.iter().map(render_trip))
}

fn join_entries(entries: impl Iterator<Item = String>) -> String {
    entries.collect::<Vec<_>>().join("\n\n")
}

fn render_driver(d: &Driver) -> String {
    let mut lines = vec![
        format!("- **{} {}** (ID: {})", d.name, d.surname, d.id),
        format!(
            "    • Stato: {}",
            if d.is_available { "✅ Disponibile" } else { "🔴 In servizio" }
        ),
        format!(
            "    • Ore guida oggi: {}h / {}h limite giornaliero",
            d.daily_hours_used, DAILY_DRIVING_LIMIT_HOURS
        ),
        format!(
            "    • Ore guida settimana: {}h / {}h limite settimanale",
            d.weekly_hours_used, WEEKLY_DRIVING_LIMIT_HOURS
        ),
        format!(
            "    • Certificato ADR: {}",
            if d.adr_certificate { "✅ Sì" } else { "❌ No" }
        ),
        format!("    • Scadenza patente: {}", format_date_it(&d.license_deadline)),
        format!("    • Scadenza CQC: {}", format_date_it(&d.cqc_deadline)),
    ];
    lines.extend(note_line(d.notes.as_deref()));
    lines.join("\n")
}

fn render_vehicle(v: &Vehicle) -> String {
    let volume = v
        .max_capacity_m3
        .filter(|m3| *m3 > 0.0)
        .map(|m3| format!(" / {} m³", m3))
        .unwrap_or_default();

    let mut lines = vec![
        format!("- **{} {}** — Targa: {} (ID: {})", v.brand, v.model, v.plate, v.id),
        format!(
            "    • Tipo: {} | Capac.: {} kg{}",
            v.vehicle_type,
            format_number_it(v.max_capacity_kg),
            volume
        ),
        format!(
            "    • Stato: {}",
            if v.is_available { "✅ Disponibile" } else { "🔴 In uso" }
        ),
        format!("    • Revisione: {}", format_date_it(&v.revision_deadline)),
        format!("    • Assicurazione: {}", format_date_it(&v.insurance_deadline)),
    ];
    lines.extend(note_line(v.notes.as_deref()));
    lines.join("\n")
}

fn render_trip(t: &Trip) -> String {
    let route = t
        .stops
        .iter()
        .map(|s| format!("{} ({})", s.city, s.stop_type))
        .collect::<Vec<_>>()
        .join(" → ");

    [
        format!(
            "- **{}** — {} km (ID: {})",
            t.cargo_type,
            format_number_it(t.total_km),
            t.id
        ),
        format!("    • Stato: {} | Data: {}", t.status, format_date_it(&t.start_date)),
        format!(
            "    • Peso: {} kg | Costo stimato: €{}",
            format_number_it(t.cargo_weight),
            format_number_it(t.estimated_cost)
        ),
        format!(
            "    • ADR: {} | Internazionale: {}",
            if t.is_adr { "⚠️ Sì" } else { "No" },
            if t.is_international { "🌍 Sì" } else { "No" }
        ),
        format!("    • Percorso: {}", route),
        format!("    • Autista assegnato: {}", assigned(t.driver_id.as_deref())),
        format!("    • Veicolo assegnato: {}", assigned(t.vehicle_id.as_deref())),
    ]
    .join("\n")
}

fn note_line(notes: Option<&str>) -> Option<String> {
    notes
        .filter(|n| !n.trim().is_empty())
        .map(|note| format!("    • Note: {}", note))
}

fn assigned(id: Option<&str>) -> &str {
    id.filter(|id| !id.is_empty()).unwrap_or(NOT_ASSIGNED)
}
