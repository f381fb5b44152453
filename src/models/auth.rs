// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Estrutura de dados ("claims") dentro do JWT.
// O login fica fora deste serviço; aqui só validamos o token emitido.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,       // Subject (ID do usuário)
    pub vendor_id: Uuid, // Fornecedor (tenant) ao qual a sessão pertence
    pub exp: usize,      // Expiration time
    pub iat: usize,      // Issued At
}
