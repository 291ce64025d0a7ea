use serde::{Deserialize, Serialize};

/// Closed list of answer literals for an enumerated question.
pub trait OptionSet: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;

    fn from_label(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|o| o.label() == value)
    }

    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|o| o.label()).collect()
    }
}

macro_rules! option_set {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => $label:tt, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( #[serde(rename = $label)] $variant, )+
        }

        impl OptionSet for $name {
            const ALL: &'static [Self] = &[$( Self::$variant, )+];

            fn label(&self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

option_set! {
    pub enum Gender {
        Male => "Hombre",
        Female => "Mujer",
        Other => "Otro",
        NoAnswer => "Prefiero no responder",
    }
}

option_set! {
    pub enum DocumentType {
        CitizenId => "Cédula de ciudadanía",
        ForeignerId => "Cédula de extranjería",
        Passport => "Pasaporte",
        TemporaryPermit => "PPT",
    }
}

impl DocumentType {
    /// Colombian cédulas are digits only; passports and permits are alphanumeric.
    pub fn is_national_id(&self) -> bool {
        matches!(self, Self::CitizenId | Self::ForeignerId)
    }
}

option_set! {
    pub enum ActiveBusinesses {
        NoneActive => "Ninguno (todas mis actividades están en pausa o cerradas)",
        One => "Uno",
        Two => "Dos",
        ThreeOrMore => "Tres o más",
        NoAnswer => "Prefiero no responder",
    }
}

option_set! {
    pub enum IncomeChange {
        DecreasedOver50 => "Han disminuido más del 50 %",
        Decreased25To50 => "Han disminuido entre 25 % y 50 %",
        DecreasedUnder25 => "Han disminuido menos del 25 %",
        Unchanged => "Se han mantenido más o menos iguales",
        IncreasedUnder25 => "Han aumentado menos del 25 %",
        Increased25To50 => "Han aumentado entre 25 % y 50 %",
        IncreasedOver50 => "Han aumentado más del 50 %",
        Unknown => "No sabe / Prefiere no responder",
    }
}

option_set! {
    pub enum CurrentEmployees {
        OnlyMe => "Ninguna (solo yo)",
        One => "1 persona",
        Two => "2 personas",
        ThreeToFive => "3 a 5 personas",
        MoreThanFive => "Más de 5 personas",
        NoAnswer => "Prefiero no responder",
    }
}

option_set! {
    pub enum EmployeeChange {
        Same => "La misma cantidad",
        OneMore => "1 persona más",
        TwoToThreeMore => "2–3 personas más",
        MoreThanThreeMore => "Más de 3 personas más",
        OneLess => "1 persona menos",
        TwoToThreeLess => "2–3 personas menos",
        MoreThanThreeLess => "Más de 3 personas menos",
    }
}

option_set! {
    pub enum GotaGotaUse {
        Yes => "Sí",
        No => "No",
        NoAnswer => "Prefiero no responder",
    }
}

option_set! {
    pub enum GotaGotaFrequency {
        Once => "Solo una vez",
        Several => "Varias veces (2 a 4 veces)",
        Frequent => "Con frecuencia (más de 4 veces)",
        NoAnswer => "Prefiero no responder",
    }
}

option_set! {
    pub enum GotaGotaReason {
        QuickMoney => "Necesitaba dinero rápido y sin trámites",
        NotEligible => "No calificaba para un préstamo formal",
        OnlyCredit => "Era el único crédito disponible",
        HabitOrTrust => "Lo hago por costumbre o confianza",
        Other => "Otra razón",
        NoAnswer => "Prefiero no responder",
    }
}

option_set! {
    pub enum FinancingOption {
        Bank => "Banco tradicional",
        Microfinance => "Microfinanciera",
        Fintech => "Fintech (Banco digital)",
        CreditCard => "Tarjeta de crédito",
        Family => "Familiares",
        Friends => "Amigos",
        NoneUsed => "Ninguna",
        NoAnswer => "Prefiero no responder",
        Other => "Otra",
    }
}

pub const COLOMBIAN_CITIES: &[&str] = &[
    "Bogotá",
    "Medellín",
    "Cali",
    "Barranquilla",
    "Cartagena",
    "Cúcuta",
    "Bucaramanga",
    "Pereira",
    "Santa Marta",
    "Ibagué",
    "Pasto",
    "Manizales",
    "Neiva",
    "Villavicencio",
    "Armenia",
];
