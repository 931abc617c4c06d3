// Appointment-only endpoints: clinical data edit and photo upload.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::PodoscanClient;
use crate::error::Error;
use crate::resource::Resource;
use crate::types::{Appointment, EditAppointmentPatientData, EntityId};

impl PodoscanClient {
    /// `PATCH /appoinments/{id}/patient-data`
    pub async fn edit_appointment_patient_data(
        &self,
        id: &EntityId,
        body: &EditAppointmentPatientData,
    ) -> Result<Appointment, Error> {
        self.patch(&format!("{}/{id}/patient-data", Appointment::PATH), body)
            .await
    }

    /// `POST /appoinments/{id}/photo` with the image as multipart field `file`.
    pub async fn upload_appointment_photo(
        &self,
        id: &EntityId,
        path: &Path,
    ) -> Result<Appointment, Error> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "photo".to_owned(), |n| n.to_string_lossy().into_owned());
        debug!(%id, file = %file_name, size = bytes.len(), "uploading appointment photo");

        self.upload_appointment_photo_bytes(id, file_name, bytes)
            .await
    }

    /// Same as [`upload_appointment_photo`](Self::upload_appointment_photo)
    /// for an in-memory image.
    pub async fn upload_appointment_photo_bytes(
        &self,
        id: &EntityId,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<Appointment, Error> {
        let mime = mime_for(&file_name);
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        self.post_multipart(&format!("{}/{id}/photo", Appointment::PATH), form)
            .await
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::mime_for;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for("foot.JPG"), "image/jpeg");
        assert_eq!(mime_for("scan.png"), "image/png");
        assert_eq!(mime_for("noext"), "application/octet-stream");
    }
}
