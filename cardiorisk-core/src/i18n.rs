//! Message catalog for the form and the results panel.
//!
//! English is the default locale; Indonesian is the only other catalog.

use crate::error::ConfigError;
use crate::schema::FeatureKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Id,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Id => "id",
        }
    }

    /// The full catalog for this locale.
    pub fn messages(&self) -> &'static Messages {
        match self {
            Self::En => &EN,
            Self::Id => &ID,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "id" | "indonesian" | "bahasa" => Ok(Self::Id),
            other => Err(ConfigError::UnknownLocale {
                value: other.to_string(),
            }),
        }
    }
}

/// Label and optional help line for one form field.
#[derive(Debug, Clone, Copy)]
pub struct FieldText {
    pub label: &'static str,
    pub help: Option<&'static str>,
}

/// All user-facing strings for one locale.
#[derive(Debug)]
pub struct Messages {
    pub title: &'static str,
    pub disclaimer: &'static str,
    pub form_header: &'static str,
    pub form_instructions: &'static str,
    pub submit: &'static str,
    pub echo_header: &'static str,
    pub results_header: &'static str,
    pub status_label: &'static str,
    pub confidence_label: &'static str,
    pub at_risk_status: &'static str,
    pub at_risk_delta: &'static str,
    pub at_risk_advisory: &'static str,
    pub safe_status: &'static str,
    pub safe_delta: &'static str,
    pub safe_advisory: &'static str,
    pub model_missing: &'static str,
    pub model_unusable: &'static str,
    pub menu_predict: &'static str,
    pub menu_edit: &'static str,
    pub menu_quit: &'static str,
    pub fields: [FieldText; FeatureKey::COUNT],
}

impl Messages {
    pub fn field(&self, key: FeatureKey) -> &FieldText {
        &self.fields[key.index()]
    }

    /// Notice shown in place of the results panel when the model failed to load.
    ///
    /// `{path}` and `{reason}` placeholders are filled from the load error.
    pub fn load_failure_notice(&self, err: &crate::error::LoadError) -> String {
        let path = err.path().display().to_string();
        match err {
            crate::error::LoadError::NotFound { .. } => self.model_missing.replace("{path}", &path),
            other => self
                .model_unusable
                .replace("{path}", &path)
                .replace("{reason}", &other.to_string()),
        }
    }
}

const fn text(label: &'static str) -> FieldText {
    FieldText { label, help: None }
}

const fn text_with_help(label: &'static str, help: &'static str) -> FieldText {
    FieldText {
        label,
        help: Some(help),
    }
}

pub static EN: Messages = Messages {
    title: "Heart Disease Prediction",
    disclaimer: "This application estimates heart disease risk with a machine learning model. \
                 The prediction is not a medical diagnosis.",
    form_header: "Enter patient data",
    form_instructions: "Fill in every medical parameter below to get a prediction.",
    submit: "Predict now",
    echo_header: "Patient data entered:",
    results_header: "Model prediction",
    status_label: "Predicted condition",
    confidence_label: "Model confidence",
    at_risk_status: "At Risk",
    at_risk_delta: "Needs medical attention",
    at_risk_advisory: "Warning: based on the data entered, the model predicts that the patient \
                       has a HIGH RISK of heart disease.",
    safe_status: "Safe",
    safe_delta: "Good condition",
    safe_advisory: "Information: based on the data entered, the model predicts that the patient \
                    has a LOW RISK (safe) of heart disease.",
    model_missing: "Model file '{path}' was not found. Make sure it is in the same folder as the application.",
    model_unusable: "Model file '{path}' could not be loaded: {reason}",
    menu_predict: "Predict now",
    menu_edit: "Edit a field",
    menu_quit: "Quit",
    fields: [
        text("Age (years)"),
        text("Sex"),
        text_with_help(
            "Chest pain type",
            "0: Typical angina, 1: Atypical angina, 2: Non-anginal pain, 3: Asymptomatic",
        ),
        text("Resting blood pressure (mm Hg)"),
        text("Serum cholesterol (mg/dl)"),
        text("Fasting blood sugar > 120 mg/dl"),
        text_with_help(
            "Resting ECG result",
            "0: Normal, 1: ST-T wave abnormality, 2: Left ventricular hypertrophy",
        ),
        text("Maximum heart rate achieved"),
        text("Exercise-induced angina"),
        text("Oldpeak (ST depression)"),
        text("Slope of the peak exercise ST segment"),
        text("Number of major vessels (ca)"),
        text_with_help(
            "Thallium stress test result",
            "0: Null, 1: Fixed defect, 2: Normal, 3: Reversible defect",
        ),
    ],
};

pub static ID: Messages = Messages {
    title: "Aplikasi Prediksi Penyakit Jantung",
    disclaimer: "Aplikasi ini memprediksi risiko penyakit jantung menggunakan model Machine Learning. \
                 Hasil prediksi ini bukanlah diagnosis medis.",
    form_header: "Masukkan Data Pasien",
    form_instructions: "Silakan isi semua parameter medis di bawah ini untuk mendapatkan prediksi.",
    submit: "Prediksi Sekarang",
    echo_header: "Data Pasien yang Anda Masukkan:",
    results_header: "Hasil Prediksi Model",
    status_label: "Prediksi Kondisi",
    confidence_label: "Tingkat Keyakinan Model",
    at_risk_status: "Berisiko",
    at_risk_delta: "Perlu Perhatian Medis",
    at_risk_advisory: "Peringatan: berdasarkan data yang dimasukkan, model memprediksi bahwa pasien \
                       memiliki RISIKO TINGGI terkena penyakit jantung.",
    safe_status: "Aman",
    safe_delta: "Kondisi Baik",
    safe_advisory: "Informasi: berdasarkan data yang dimasukkan, model memprediksi bahwa pasien \
                    memiliki RISIKO RENDAH (aman) dari penyakit jantung.",
    model_missing: "File model '{path}' tidak ditemukan. Pastikan file berada di folder yang sama dengan aplikasi.",
    model_unusable: "File model '{path}' tidak dapat dimuat: {reason}",
    menu_predict: "Prediksi Sekarang",
    menu_edit: "Ubah isian",
    menu_quit: "Keluar",
    fields: [
        text("Umur (Tahun)"),
        text("Jenis Kelamin"),
        text_with_help(
            "Jenis Nyeri Dada (Chest Pain)",
            "0: Tipikal Angina, 1: Atipikal Angina, 2: Nyeri Non-angina, 3: Asimtomatik",
        ),
        text("Tekanan Darah Istirahat (mm Hg)"),
        text("Kolesterol Serum (mg/dl)"),
        text("Gula Darah Puasa > 120 mg/dl"),
        text_with_help(
            "Hasil EKG Istirahat",
            "0: Normal, 1: Kelainan Gelombang ST-T, 2: Hipertrofi Ventrikel Kiri",
        ),
        text("Detak Jantung Maksimum"),
        text("Angina Akibat Olahraga"),
        text("Oldpeak (Depresi ST)"),
        text("Slope dari Puncak Latihan ST"),
        text("Jumlah Pembuluh Darah Utama (ca)"),
        text_with_help(
            "Hasil Tes Thallium Stress",
            "0: Null, 1: Cacat Tetap, 2: Normal, 3: Cacat Reversibel",
        ),
    ],
};
