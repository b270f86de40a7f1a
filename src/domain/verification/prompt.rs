//! Verification prompt construction

use crate::domain::chunk::{Chunk, ChunkKind};

/// Maximum characters of text or table content shown to the judge
pub const MAX_EXCERPT_CHARS: usize = 2000;

const UNKNOWN_DOCUMENT: &str = "Inconnu";
const UNKNOWN_SOURCE_CODE: &str = "INCONNU";
const UNKNOWN_PAGE: &str = "N/A";
const NO_DESCRIPTION: &str = "Aucune description";

const INSTRUCTION: &str = r#"CONTEXTE: Vous êtes un expert en réglementations automobiles chargé d'évaluer la pertinence d'un FRAGMENT de document pour répondre à une QUESTION.

OBJECTIF: Décider si le fragment contient des informations POTENTIELLEMENT utiles.

RÉPONDEZ STRICTEMENT par un objet JSON valide SANS commentaire ni Markdown.
Format attendu : {"useful": <true|false>, "confidence": <nombre entre 0 et 1>}

Définition des champs :
 • useful      : true si le fragment contient AU MOINS UNE information pertinente.
 • confidence  : score de confiance de votre évaluation.

EXEMPLES
────────────────────────────────
Question : Quelle est la largeur maximale autorisée d'un bus ?
Fragment : "La largeur maximale des véhicules M3 est fixée à 2,55 m..."
Réponse : {"useful": true, "confidence": 0.93}

Question : Quelle est la largeur maximale autorisée d'un bus ?
Fragment : "Les émissions sonores doivent être inférieures à 80 dB..."
Réponse : {"useful": false, "confidence": 0.88}
"#;

/// Build the judge prompt for one chunk. Every variant carries the chunk
/// identity (document, source code, page) and the question.
pub fn build_verification_prompt(query: &str, chunk: &Chunk) -> String {
    let identity = identity_block(chunk);
    let page = page_label(chunk);

    match chunk.kind {
        ChunkKind::Image => format!(
            "{INSTRUCTION}\n\n**[Évaluation d'Image]**\n{identity}\
             Contexte: {description}\n\
             Page: {page}\n\n\
             QUESTION: \"{query}\"\n\n\
             Cette image contient-elle des informations potentiellement utiles pour cette question?",
            description = chunk.description.as_deref().unwrap_or(NO_DESCRIPTION),
        ),
        ChunkKind::Table => format!(
            "{INSTRUCTION}\n\n**[Évaluation de Tableau]**\n{identity}\
             Page: {page}\n\
             Contenu du tableau:\n{excerpt}\n\n\
             QUESTION: \"{query}\"\n\n\
             Ce tableau contient-il des informations potentiellement utiles pour cette question?",
            excerpt = excerpt(chunk.content.trim()),
        ),
        ChunkKind::Text => format!(
            "{INSTRUCTION}\n\n**[Évaluation de Texte]**\n{identity}\
             Page: {page}\n\
             Contenu:\n{excerpt}\n\n\
             QUESTION: \"{query}\"\n\n\
             Ce texte contient-il des informations potentiellement utiles pour cette question?",
            excerpt = excerpt(&chunk.content),
        ),
    }
}

fn identity_block(chunk: &Chunk) -> String {
    format!(
        "Document: {}\nRèglement: {}\n",
        chunk
            .metadata
            .document_name
            .as_deref()
            .unwrap_or(UNKNOWN_DOCUMENT),
        chunk
            .metadata
            .source_code
            .as_deref()
            .unwrap_or(UNKNOWN_SOURCE_CODE),
    )
}

fn page_label(chunk: &Chunk) -> String {
    chunk
        .metadata
        .page_number
        .map(|p| p.to_string())
        .unwrap_or_else(|| UNKNOWN_PAGE.to_string())
}

/// First `MAX_EXCERPT_CHARS` characters, never splitting a code point
fn excerpt(content: &str) -> &str {
    match content.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((byte_index, _)) => &content[..byte_index],
        None => content,
    }
}
