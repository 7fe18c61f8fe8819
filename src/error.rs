use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileToolError {
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unter der Pfadangabe {0} existiert keine Datei")]
    NotFound(String),

    #[error("Die Pfadangabe {0} referenziert nicht auf ein Verzeichnis")]
    NotADirectory(String),

    #[error("Die Pfadangabe {0} referenziert auf ein Verzeichnis und nicht auf eine Datei")]
    IsADirectory(String),

    #[error("Entweder das Zielverzeichnis {target} oder die Datei {file}, die kopiert werden soll, existiert nicht")]
    TargetMissing { target: String, file: String },

    #[error("Konnte {0} nicht löschen")]
    CannotDelete(String),

    #[error("Die Datei {name} konnte im Verzeichnis {dir} nicht angelegt werden: {reason}")]
    CannotCreate {
        name: String,
        dir: String,
        reason: String,
    },

    #[error("Konnte die Datei {name} nicht in das Verzeichnis {target} kopieren: {reason}")]
    CopyFailed {
        name: String,
        target: String,
        reason: String,
    },

    #[error("Kein Dokumentinhalt vorhanden: {0}")]
    NoContent(String),

    #[error("Der Inhalt ist leer, bitte geben Sie einen Inhalt an")]
    EmptyContent,

    #[error("Zip-Fehler: {0}")]
    Zip(String),

    #[error("Archiv-Fehler: {0}")]
    Archive(String),

    #[error("Unbekannter Zeichensatz: {0}")]
    Encoding(String),

    #[error("Inhalt ist im Zeichensatz {0} nicht gültig")]
    Decode(String),

    #[error("Pfad-Fehler: {0}")]
    Path(String),

    #[error("Logging konnte nicht gestartet werden: {0}")]
    Logger(String),
}

impl From<walkdir::Error> for FileToolError {
    fn from(err: walkdir::Error) -> Self {
        FileToolError::Io(err.into())
    }
}

impl From<std::path::StripPrefixError> for FileToolError {
    fn from(err: std::path::StripPrefixError) -> Self {
        FileToolError::Path(err.to_string())
    }
}

impl From<zip::result::ZipError> for FileToolError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => FileToolError::Io(e),
            other => FileToolError::Zip(other.to_string()),
        }
    }
}

impl From<log::SetLoggerError> for FileToolError {
    fn from(err: log::SetLoggerError) -> Self {
        FileToolError::Logger(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FileToolError>;
