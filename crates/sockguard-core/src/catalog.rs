//! Fixed option sets offered by the add form.
//!
//! Values are stored by the backend verbatim, so they must match what it
//! already holds.

/// A named color with its display hex code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorOption {
    pub name: &'static str,
    pub hex: &'static str,
}

/// Hex used for colors outside the palette.
pub const FALLBACK_HEX: &str = "#6c757d";

pub static PALETTE: [ColorOption; 15] = [
    ColorOption { name: "Черный", hex: "#2c3e50" },
    ColorOption { name: "Белый", hex: "#ecf0f1" },
    ColorOption { name: "Серый", hex: "#7f8c8d" },
    ColorOption { name: "Синий", hex: "#3498db" },
    ColorOption { name: "Зеленый", hex: "#27ae60" },
    ColorOption { name: "Красный", hex: "#e74c3c" },
    ColorOption { name: "Желтый", hex: "#f1c40f" },
    ColorOption { name: "Фиолетовый", hex: "#9b59b6" },
    ColorOption { name: "Розовый", hex: "#e84393" },
    ColorOption { name: "Оранжевый", hex: "#e67e22" },
    ColorOption { name: "Голубой", hex: "#00cec9" },
    ColorOption { name: "Коричневый", hex: "#a1887f" },
    ColorOption { name: "Бежевый", hex: "#f5deb3" },
    ColorOption { name: "Бирюзовый", hex: "#1abc9c" },
    ColorOption { name: "Мятный", hex: "#98ff98" },
];

pub const STYLES: [&str; 15] = [
    "Спортивные",
    "Повседневные",
    "Домашние",
    "Бизнес",
    "Длинные",
    "Короткие",
    "Новогодние",
    "Полосатые",
    "В горошек",
    "Термо",
    "Шерстяные",
    "Хлопковые",
    "Шелковые",
    "Компрессионные",
    "Носки-следки",
];

pub const PATTERNS: [&str; 11] = [
    "Однотонные",
    "Полоска",
    "Горошек",
    "Клетка",
    "Геометрия",
    "Принт",
    "Градиент",
    "Мраморные",
    "Анималистика",
    "Абстракция",
    "Камуфляж",
];

pub const MATERIALS: [&str; 12] = [
    "Хлопок",
    "Шерсть",
    "Синтетика",
    "Шелк",
    "Бамбук",
    "Кашемир",
    "Микрофибра",
    "Меринос",
    "Лен",
    "Акрил",
    "Полиэстер",
    "Спандекс",
];

pub const SIZES: [&str; 7] = ["XS", "S", "M", "L", "XL", "XXL", "XXXL"];

pub const BRANDS: [&str; 15] = [
    "Nike",
    "Adidas",
    "Puma",
    "Reebok",
    "Under Armour",
    "Uniqlo",
    "H&M",
    "Calvin Klein",
    "Hugo Boss",
    "Gucci",
    "Armani",
    "Balenciaga",
    "New Balance",
    "Asics",
    "Unknown",
];

/// Look up a palette color by name, ignoring case.
pub fn find_color(name: &str) -> Option<&'static ColorOption> {
    let name = name.trim().to_lowercase();
    PALETTE.iter().find(|c| c.name.to_lowercase() == name)
}

/// Hex code for a color name, or [`FALLBACK_HEX`] when it is not in the palette.
pub fn hex_for(name: &str) -> &'static str {
    find_color(name).map(|c| c.hex).unwrap_or(FALLBACK_HEX)
}

/// Return the canonical spelling of `value` if it belongs to `options`.
///
/// Matching ignores case and surrounding whitespace.
pub fn canonical(options: &[&'static str], value: &str) -> Option<&'static str> {
    let value = value.trim().to_lowercase();
    options.iter().copied().find(|o| o.to_lowercase() == value)
}
