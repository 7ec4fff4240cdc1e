//! Form payloads submitted by the pages and their validation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use usina_http::types::{Credentials, NewUser};

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Why a submitted form was rejected; the message is shown on the form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Email e senha são obrigatórios")]
    MissingCredentials,

    #[error("Todos os campos obrigatórios devem ser preenchidos")]
    MissingFields,

    #[error("As senhas não coincidem")]
    PasswordMismatch,

    #[error("A senha deve ter pelo menos 6 caracteres")]
    PasswordTooShort,

    #[error("Você deve aceitar os termos de uso")]
    TermsNotAccepted,

    #[error("A quantidade deve ser um número inteiro positivo")]
    InvalidQuantity,

    #[error("Data de entrega inválida")]
    InvalidDate,
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(self) -> Result<Credentials, FormError> {
        if !filled(&self.email) || self.password.is_empty() {
            return Err(FormError::MissingCredentials);
        }
        Ok(Credentials {
            email: self.email.trim().to_string(),
            password: self.password,
        })
    }
}

/// Account registration form (`/cadastro-usuario`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationForm {
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub confirmar_senha: String,
    pub telefone: Option<String>,
    pub cargo: String,
    pub empresa: Option<String>,
    /// Checkbox; absent when unticked
    pub aceitar_termos: Option<String>,
}

impl RegistrationForm {
    pub fn validate(self) -> Result<NewUser, FormError> {
        if ![
            &self.nome,
            &self.email,
            &self.senha,
            &self.confirmar_senha,
            &self.cargo,
        ]
        .iter()
        .all(|field| filled(field))
        {
            return Err(FormError::MissingFields);
        }
        if self.senha != self.confirmar_senha {
            return Err(FormError::PasswordMismatch);
        }
        if self.senha.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::PasswordTooShort);
        }
        if self.aceitar_termos.as_deref().is_none_or(|v| v.is_empty()) {
            return Err(FormError::TermsNotAccepted);
        }

        let nome = self.nome.trim();
        let (first_name, last_name) = match nome.split_once(char::is_whitespace) {
            Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
            None => (nome.to_string(), String::new()),
        };

        Ok(NewUser {
            first_name,
            last_name,
            email: self.email.trim().to_string(),
            password: self.senha,
            telefone: optional(self.telefone),
            cargo: self.cargo.trim().to_string(),
            empresa: optional(self.empresa),
        })
    }
}

/// Part registration form (`/cadastro`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartForm {
    pub cliente: String,
    pub numero_pedido: String,
    pub codigo_peca: String,
    pub quantidade: String,
    pub data_entrega: String,
    pub prioridade: Option<String>,
    pub observacoes: Option<String>,
}

/// Body posted to the upstream `pecas/` collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPart {
    pub cliente: String,
    pub numero_pedido: String,
    pub codigo_peca: String,
    pub quantidade: u32,
    pub data_entrega: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prioridade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criado_por: Option<i64>,
}

impl PartForm {
    pub fn validate(self, created_by: Option<i64>) -> Result<NewPart, FormError> {
        if ![
            &self.cliente,
            &self.numero_pedido,
            &self.codigo_peca,
            &self.quantidade,
            &self.data_entrega,
        ]
        .iter()
        .all(|field| filled(field))
        {
            return Err(FormError::MissingFields);
        }

        let quantidade = match self.quantidade.trim().parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return Err(FormError::InvalidQuantity),
        };
        let data_entrega = NaiveDate::parse_from_str(self.data_entrega.trim(), "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate)?;

        Ok(NewPart {
            cliente: self.cliente.trim().to_string(),
            numero_pedido: self.numero_pedido.trim().to_string(),
            codigo_peca: self.codigo_peca.trim().to_string(),
            quantidade,
            data_entrega,
            prioridade: optional(self.prioridade),
            observacoes: optional(self.observacoes),
            criado_por: created_by,
        })
    }
}
