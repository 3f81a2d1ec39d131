use phf::{Set, phf_set};

static ELEMENT_SYMBOLS: Set<&'static str> = phf_set! {
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr",
};

// Two-letter elements that ligand files commonly spell in upper case.
static UPPERCASE_TWO_LETTER: Set<&'static str> = phf_set! {
    "CL", "BR", "NA", "MG", "ZN", "FE", "MN", "CU", "CO", "NI", "LI", "SE", "SI", "AL",
};

/// Normalizes an element token such as `"cl"`, `"CL"` or `"Cl"` to `"Cl"`.
///
/// Returns `None` when the token is not a known element symbol.
pub fn normalize_symbol(token: &str) -> Option<String> {
    let token = token.trim();
    let mut chars = token.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let rest: String = chars.map(|c| c.to_ascii_lowercase()).collect();
    let symbol = format!("{first}{rest}");
    ELEMENT_SYMBOLS.contains(symbol.as_str()).then_some(symbol)
}

/// Guesses the element of an atom from an atom name or a Tripos type label.
///
/// The part before a `.` is used (`"C.ar"` gives `"C"`), digits and other
/// trailing characters are ignored. Mixed-case two-letter prefixes (`"Cl3"`)
/// are taken as written; upper-case ones (`"CL3"`) only for a short list of
/// elements that occur in ligands, so that `"CA"` stays a carbon.
pub fn guess_element_symbol(token: &str) -> Option<String> {
    let head = token.trim().split('.').next().unwrap_or("");
    let alpha: String = head
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    let mut chars = alpha.chars();
    let first = chars.next()?;
    if let Some(second) = chars.next() {
        if second.is_ascii_lowercase() && first.is_ascii_uppercase() {
            let candidate = format!("{first}{second}");
            if ELEMENT_SYMBOLS.contains(candidate.as_str()) {
                return Some(candidate);
            }
        }
        let upper: String = [first, second]
            .iter()
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if alpha.len() == 2 && UPPERCASE_TWO_LETTER.contains(upper.as_str()) {
            return normalize_symbol(&upper);
        }
    }
    normalize_symbol(&first.to_string())
}
