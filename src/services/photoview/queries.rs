//! GraphQL documents sent to the Photoview API.

pub const AUTHORIZE_USER: &str = r#"
mutation AuthorizeUser($username: String!, $password: String!) {
    authorizeUser(username: $username, password: $password) {
        success
        status
        token
    }
}
"#;

pub const ROOT_ALBUMS: &str = r#"
query getMyRootAlbums {
    myAlbums(order: {order_by: "title"}, onlyRoot: true, showEmpty: true) {
        id
        title
        thumbnail {
            id
            thumbnail {
                url
            }
        }
    }
}
"#;

pub const ALL_ALBUMS: &str = r#"
query GetAlbums {
    myAlbums {
        id
        title
    }
}
"#;

pub const ALBUM_PATH: &str = r#"
query albumPathQuery($id: ID!) {
    album(id: $id) {
        id
        path {
            id
            title
        }
    }
}
"#;

pub const ALBUM_CHILDREN: &str = r#"
query getAlbumChildren($id: ID!) {
    album(id: $id) {
        subAlbums {
            id
            title
            thumbnail {
                id
                thumbnail {
                    url
                }
            }
        }
    }
}
"#;

pub const ALBUM_DETAILS: &str = r#"
query getAlbumDetails($id: ID!) {
    album(id: $id) {
        id
        title
    }
}
"#;

pub const MEDIA_URL: &str = r#"
query getMediaUrl($id: ID!) {
    media(id: $id) {
        id
        highRes {
            url
        }
    }
}
"#;

pub const ALBUM_PHOTOS: &str = r#"
query GetAlbumPhotos($albumId: ID!) {
    album(id: $albumId) {
        media {
            id
            title
            type
            thumbnail {
                url
            }
        }
    }
}
"#;

pub const ALL_PHOTOS: &str = r#"
query GetAllPhotos {
    myMedia {
        id
        title
        type
        thumbnail {
            url
        }
    }
}
"#;
