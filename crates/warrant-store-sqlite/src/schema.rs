//! SQL schema for the Warrant SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Entity rows are never hard-deleted: a non-null `deleted` timestamp hides
/// them from every read.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id    INTEGER PRIMARY KEY,
    long_name  TEXT NOT NULL,
    created    TEXT NOT NULL,
    deleted    TEXT
);

CREATE TABLE IF NOT EXISTS persorgs (
    persorg_id      INTEGER PRIMARY KEY,
    name            TEXT NOT NULL,
    is_organization INTEGER NOT NULL DEFAULT 0,
    created         TEXT NOT NULL,
    deleted         TEXT
);

CREATE TABLE IF NOT EXISTS propositions (
    proposition_id  INTEGER PRIMARY KEY,
    text            TEXT NOT NULL,
    creator_user_id INTEGER NOT NULL REFERENCES users(user_id),
    created         TEXT NOT NULL,
    deleted         TEXT
);

CREATE TABLE IF NOT EXISTS statements (
    statement_id       INTEGER PRIMARY KEY,
    speaker_persorg_id INTEGER NOT NULL REFERENCES persorgs(persorg_id),
    sentence_type      TEXT NOT NULL,   -- 'PROPOSITION' | 'STATEMENT'
    sentence_id        INTEGER NOT NULL,
    creator_user_id    INTEGER NOT NULL REFERENCES users(user_id),
    created            TEXT NOT NULL,
    deleted            TEXT
);

CREATE TABLE IF NOT EXISTS writs (
    writ_id         INTEGER PRIMARY KEY,
    title           TEXT NOT NULL,
    creator_user_id INTEGER NOT NULL REFERENCES users(user_id),
    created         TEXT NOT NULL,
    deleted         TEXT
);

CREATE TABLE IF NOT EXISTS writ_quotes (
    writ_quote_id   INTEGER PRIMARY KEY,
    writ_id         INTEGER NOT NULL REFERENCES writs(writ_id),
    quote_text      TEXT NOT NULL,
    creator_user_id INTEGER NOT NULL REFERENCES users(user_id),
    created         TEXT NOT NULL,
    deleted         TEXT
);

CREATE TABLE IF NOT EXISTS urls (
    url_id  INTEGER PRIMARY KEY,
    url     TEXT NOT NULL UNIQUE,
    created TEXT NOT NULL,
    deleted TEXT
);

CREATE TABLE IF NOT EXISTS writ_quote_urls (
    writ_quote_id INTEGER NOT NULL REFERENCES writ_quotes(writ_quote_id),
    url_id        INTEGER NOT NULL REFERENCES urls(url_id),
    created       TEXT NOT NULL,
    deleted       TEXT,
    PRIMARY KEY (writ_quote_id, url_id)
);

-- Where on a URL a writ quote was confirmed to appear.
CREATE TABLE IF NOT EXISTS writ_quote_url_targets (
    url_target_id INTEGER PRIMARY KEY,
    writ_quote_id INTEGER NOT NULL REFERENCES writ_quotes(writ_quote_id),
    url_id        INTEGER NOT NULL REFERENCES urls(url_id),
    created       TEXT NOT NULL,
    deleted       TEXT
);

CREATE TABLE IF NOT EXISTS writ_quote_url_target_anchors (
    anchor_id     INTEGER PRIMARY KEY,
    url_target_id INTEGER NOT NULL REFERENCES writ_quote_url_targets(url_target_id),
    exact_text    TEXT NOT NULL,
    prefix_text   TEXT NOT NULL,
    suffix_text   TEXT NOT NULL,
    start_offset  INTEGER NOT NULL,
    end_offset    INTEGER NOT NULL,
    deleted       TEXT
);

CREATE TABLE IF NOT EXISTS media_excerpts (
    media_excerpt_id INTEGER PRIMARY KEY,
    quotation        TEXT NOT NULL,
    creator_user_id  INTEGER NOT NULL REFERENCES users(user_id),
    created          TEXT NOT NULL,
    deleted          TEXT
);

CREATE TABLE IF NOT EXISTS url_locators (
    url_locator_id   INTEGER PRIMARY KEY,
    media_excerpt_id INTEGER NOT NULL REFERENCES media_excerpts(media_excerpt_id),
    url_id           INTEGER NOT NULL REFERENCES urls(url_id),
    created          TEXT NOT NULL,
    deleted          TEXT
);

-- Strictly append-only: no UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS url_locator_auto_confirmation_results (
    result_id       INTEGER PRIMARY KEY,
    url_locator_id  INTEGER NOT NULL REFERENCES url_locators(url_locator_id),
    complete_at     TEXT NOT NULL,
    status          TEXT NOT NULL,   -- 'FOUND' | 'NOT_FOUND' | 'ERROR'
    quotation       TEXT NOT NULL,
    found_quotation TEXT,
    error_message   TEXT
);

CREATE TABLE IF NOT EXISTS sources (
    source_id   INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    created     TEXT NOT NULL,
    deleted     TEXT
);

CREATE TABLE IF NOT EXISTS media_excerpt_citations (
    media_excerpt_id INTEGER NOT NULL REFERENCES media_excerpts(media_excerpt_id),
    source_id        INTEGER NOT NULL REFERENCES sources(source_id),
    pincite          TEXT,
    created          TEXT NOT NULL,
    deleted          TEXT
);

CREATE TABLE IF NOT EXISTS source_excerpt_paraphrases (
    source_excerpt_paraphrase_id INTEGER PRIMARY KEY,
    paraphrasing_proposition_id  INTEGER NOT NULL REFERENCES propositions(proposition_id),
    source_excerpt_type          TEXT NOT NULL,   -- 'WRIT_QUOTE' | 'MEDIA_EXCERPT'
    source_excerpt_id            INTEGER NOT NULL,
    creator_user_id              INTEGER NOT NULL REFERENCES users(user_id),
    created                      TEXT NOT NULL,
    deleted                      TEXT
);

CREATE TABLE IF NOT EXISTS proposition_compounds (
    proposition_compound_id INTEGER PRIMARY KEY,
    creator_user_id         INTEGER NOT NULL REFERENCES users(user_id),
    created                 TEXT NOT NULL,
    deleted                 TEXT
);

-- Atoms are immutable; order_position is the only ordering key.
CREATE TABLE IF NOT EXISTS proposition_compound_atoms (
    proposition_compound_id INTEGER NOT NULL
        REFERENCES proposition_compounds(proposition_compound_id),
    proposition_id          INTEGER NOT NULL REFERENCES propositions(proposition_id),
    order_position          INTEGER NOT NULL,
    PRIMARY KEY (proposition_compound_id, proposition_id)
);

CREATE TABLE IF NOT EXISTS justification_basis_compounds (
    justification_basis_compound_id INTEGER PRIMARY KEY,
    creator_user_id                 INTEGER NOT NULL REFERENCES users(user_id),
    created                         TEXT NOT NULL,
    deleted                         TEXT
);

CREATE TABLE IF NOT EXISTS justification_basis_compound_atoms (
    justification_basis_compound_atom_id INTEGER PRIMARY KEY,
    justification_basis_compound_id      INTEGER NOT NULL
        REFERENCES justification_basis_compounds(justification_basis_compound_id),
    entity_type                          TEXT NOT NULL,   -- 'PROPOSITION' | 'SOURCE_EXCERPT_PARAPHRASE'
    entity_id                            INTEGER NOT NULL,
    order_position                       INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS justifications (
    justification_id INTEGER PRIMARY KEY,
    root_target_type TEXT NOT NULL,      -- 'PROPOSITION' | 'STATEMENT'
    root_target_id   INTEGER NOT NULL,
    root_polarity    TEXT NOT NULL,      -- 'POSITIVE' | 'NEGATIVE'
    target_type      TEXT NOT NULL,      -- 'PROPOSITION' | 'STATEMENT' | 'JUSTIFICATION'
    target_id        INTEGER NOT NULL,
    basis_type       TEXT NOT NULL,      -- see BasisType
    basis_id         INTEGER NOT NULL,
    polarity         TEXT NOT NULL,
    creator_user_id  INTEGER NOT NULL REFERENCES users(user_id),
    created          TEXT NOT NULL,
    deleted          TEXT
);

CREATE INDEX IF NOT EXISTS justifications_target_idx
    ON justifications(target_type, target_id);
CREATE INDEX IF NOT EXISTS justifications_basis_idx
    ON justifications(basis_type, basis_id);
CREATE INDEX IF NOT EXISTS justifications_created_idx
    ON justifications(created);
CREATE INDEX IF NOT EXISTS pc_atoms_proposition_idx
    ON proposition_compound_atoms(proposition_id);
CREATE INDEX IF NOT EXISTS jbc_atoms_entity_idx
    ON justification_basis_compound_atoms(entity_type, entity_id);
CREATE INDEX IF NOT EXISTS url_locators_media_excerpt_idx
    ON url_locators(media_excerpt_id);
CREATE INDEX IF NOT EXISTS auto_confirmation_locator_idx
    ON url_locator_auto_confirmation_results(url_locator_id, complete_at);

PRAGMA user_version = 1;
";
