use super::{json_body, FemsqApi};
use crate::error::Result;
use crate::transport::ApiRequest;
use crate::types::{DirectoryDto, FileDto, FileRequest, FileTypeDto};

const DIRECTORIES: &str = "ra/directories";
const FILES: &str = "ra/files";
const FILE_TYPES: &str = "ra/file-types";

impl FemsqApi {
    // ==================== Directories ====================

    pub async fn list_directories(&self) -> Result<Vec<DirectoryDto>> {
        self.send_json(ApiRequest::get(DIRECTORIES)).await
    }

    pub async fn get_directory(&self, id: i64) -> Result<DirectoryDto> {
        self.send_json(ApiRequest::get(format!("{}/{}", DIRECTORIES, id)))
            .await
    }

    pub async fn directory_files(&self, dir_id: i64) -> Result<Vec<FileDto>> {
        self.send_json(ApiRequest::get(format!("{}/{}/files", DIRECTORIES, dir_id)))
            .await
    }

    // ==================== Files ====================

    pub async fn list_files(&self) -> Result<Vec<FileDto>> {
        self.send_json(ApiRequest::get(FILES)).await
    }

    pub async fn get_file(&self, id: i64) -> Result<FileDto> {
        self.send_json(ApiRequest::get(format!("{}/{}", FILES, id)))
            .await
    }

    pub async fn create_file(&self, request: &FileRequest) -> Result<FileDto> {
        let body = json_body(FILES, request)?;
        self.send_json(ApiRequest::post(FILES, body)).await
    }

    pub async fn update_file(&self, id: i64, request: &FileRequest) -> Result<FileDto> {
        let path = format!("{}/{}", FILES, id);
        let body = json_body(&path, request)?;
        self.send_json(ApiRequest::put(path, body)).await
    }

    pub async fn delete_file(&self, id: i64) -> Result<()> {
        self.send_unit(ApiRequest::delete(format!("{}/{}", FILES, id)))
            .await
    }

    // ==================== File types ====================

    pub async fn list_file_types(&self) -> Result<Vec<FileTypeDto>> {
        self.send_json(ApiRequest::get(FILE_TYPES)).await
    }

    pub async fn get_file_type(&self, id: i64) -> Result<FileTypeDto> {
        self.send_json(ApiRequest::get(format!("{}/{}", FILE_TYPES, id)))
            .await
    }
}
