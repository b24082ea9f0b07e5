use serde::Serialize;

/// One-click optimization request offered by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub query: &'static str,
}

pub const PRESETS: &[Preset] = &[
    Preset {
        id: "assign-drivers",
        label: "Assegna autisti ai viaggi",
        query: "Analizza i viaggi pianificati e suggerisci la migliore assegnazione degli autisti disponibili, rispettando i limiti di ore di guida e i requisiti ADR.",
    },
    Preset {
        id: "optimize-routes",
        label: "Ottimizza rotte",
        query: "Ottimizza le rotte dei viaggi pianificati per ridurre i chilometri totali percorsi e i costi di carburante e pedaggi.",
    },
    Preset {
        id: "check-compliance",
        label: "Verifica compliance",
        query: "Verifica la conformità normativa di tutti i viaggi pianificati: ore di guida CE 561/2006, requisiti ADR, documenti CMR per i viaggi internazionali, scadenze certificazioni autisti.",
    },
    Preset {
        id: "reduce-costs",
        label: "Riduci costi operativi",
        query: "Analizza le assegnazioni attuali e suggerisci come ridurre i costi operativi totali ottimizzando l'uso dei veicoli e le rotte.",
    },
    Preset {
        id: "plan-week",
        label: "Pianifica la settimana",
        query: "Pianifica la migliore distribuzione dei viaggi per la settimana tenendo conto della disponibilità degli autisti, dei veicoli, dei limiti settimanali di ore di guida e delle priorità di consegna.",
    },
];

pub fn find_preset(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.id == id)
}
