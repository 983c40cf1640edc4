// Fixed replies shown to the user instead of a model answer.

pub const LANGUAGE_REFUSAL: &str =
    "Awel, nee: ik klap hier enkel Plat Vlaams. Probeer ’t ne keer in ’t Vlaams.";

pub const INJECTION_REFUSAL: &str =
    "Awel, nee: stop me da foefelen. Zeg ’t gewoon in ’t Vlaams en zonder trukken.";

pub const TOO_LONG: &str =
    "Amai, da’s nen epistel. Maak ’t wat korter, of splitst ’t in stukskes.";

/// Request body over the byte ceiling, rejected before parsing.
pub const TOO_LARGE: &str = "Da is te veel ineens, jong.";

pub const RATE_LIMITED: &str =
    "Rustig, maat. Ge zit aan de limiet. Wacht efkes en probeer opnieuw.";

pub const OFFLINE: &str = "AI is offline. Op ’t domein moogt `OLLAMA_BASE_URL` ni op `localhost` staan: zet in Vercel env `OLLAMA_BASE_URL` + `OLLAMA_MODEL` naar uwe Ollama server.";
